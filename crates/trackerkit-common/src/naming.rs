//! Song titles and filename conventions.
//!
//! Amiga rippers name files `PREFIX.title` (`MOD.axelf`, `NTP.intro`), PC
//! tools use `title.ext`. Both forms are matched without regard to ASCII case.

/// Final path component of `filename`, accepting `/` and `\` separators.
pub fn base_name(filename: &str) -> &str {
    filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
}

/// `true` if `name` starts with `prefix`, ignoring ASCII case.
pub fn has_prefix_ci(name: &str, prefix: &str) -> bool {
    name.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// `true` if `name` ends with `suffix`, ignoring ASCII case.
pub fn has_suffix_ci(name: &str, suffix: &str) -> bool {
    name.len()
        .checked_sub(suffix.len())
        .and_then(|start| name.get(start..))
        .is_some_and(|tail| tail.eq_ignore_ascii_case(suffix))
}

/// Strip the first matching prefix and the first matching suffix.
pub fn strip_affixes<'a>(name: &'a str, prefixes: &[&str], suffixes: &[&str]) -> &'a str {
    let mut stem = name;
    if let Some(prefix) = prefixes.iter().find(|p| has_prefix_ci(stem, p)) {
        stem = &stem[prefix.len()..];
    }
    if let Some(suffix) = suffixes.iter().find(|s| has_suffix_ci(stem, s)) {
        stem = &stem[..stem.len() - suffix.len()];
    }
    stem
}

/// Pick a title: the embedded one if it has visible text, else the filename
/// stem without format affixes, else `fallback`.
pub fn song_title(
    embedded: Option<&str>,
    filename: Option<&str>,
    prefixes: &[&str],
    suffixes: &[&str],
    fallback: &str,
) -> String {
    if let Some(title) = embedded.map(str::trim).filter(|t| !t.is_empty()) {
        return title.to_string();
    }
    filename
        .map(|name| strip_affixes(base_name(name), prefixes, suffixes).trim())
        .filter(|stem| !stem.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// `"<title> [<tag>]"`.
pub fn tagged_name(title: &str, tag: &str) -> String {
    format!("{title} [{tag}]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("mods/amiga/MOD.axelf"), "MOD.axelf");
        assert_eq!(base_name(r"C:\music\intro.xm"), "intro.xm");
        assert_eq!(base_name("plain"), "plain");
    }

    #[test]
    fn test_affix_matching_ignores_case() {
        assert!(has_prefix_ci("ntp.Intro", "NTP."));
        assert!(has_suffix_ci("voice.ADPCM", ".adpcm"));
        assert!(!has_suffix_ci("pcm", ".adpcm"));
        // Never splits a multi-byte character.
        assert!(!has_prefix_ci("é.mod", "MOD."));
    }

    #[test]
    fn test_strip_affixes() {
        assert_eq!(strip_affixes("PAP.title", &["PAP."], &[".pap"]), "title");
        assert_eq!(strip_affixes("title.pap", &["PAP."], &[".pap"]), "title");
        assert_eq!(strip_affixes("title.mod", &["PAP."], &[".pap"]), "title.mod");
    }

    #[test]
    fn test_song_title_precedence() {
        assert_eq!(
            song_title(Some(" space debris "), Some("x.mod"), &[], &[".mod"], "MOD"),
            "space debris"
        );
        assert_eq!(
            song_title(Some(""), Some("dir/MOD.axelf"), &["MOD."], &[".mod"], "ProTracker"),
            "axelf"
        );
        assert_eq!(
            song_title(None, None, &[], &[], "NovoTrade Packer"),
            "NovoTrade Packer"
        );
        assert_eq!(song_title(None, Some("NTP."), &["NTP."], &[], "NovoTrade"), "NovoTrade");
    }

    #[test]
    fn test_tagged_name() {
        assert_eq!(tagged_name("axelf", "MOD"), "axelf [MOD]");
    }
}

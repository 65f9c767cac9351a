//! Text normalization helpers
//!
//! Campaign names arrive from two places (the popup provider payload and the
//! lookup spreadsheet) and are compared after both sides go through the same
//! normalization.

/// Spellings of "simulação" seen in campaign names (accents are often dropped)
const SIMULATION_SPELLINGS: [&str; 4] = ["simulação", "simulacão", "simulaçao", "simulacao"];

/// Trim surrounding whitespace and lowercase
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Normalize a popup campaign name for lookup
///
/// Strips the leading `Simulação de Financiamento -` phrase added by the
/// provider's templates and collapses internal whitespace runs, so names
/// copy/pasted with stray spaces still resolve to the same key.
pub fn normalize_campaign_name(value: &str) -> String {
    let lowered = normalize(value);
    let stripped = strip_financing_prefix(&lowered);
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove `simulação de financiamento <ws>-<ws>` from the start of an already lowercased name
fn strip_financing_prefix(value: &str) -> &str {
    for spelling in SIMULATION_SPELLINGS {
        let Some(rest) = value
            .strip_prefix(spelling)
            .and_then(|r| r.strip_prefix(" de financiamento"))
        else {
            continue;
        };
        if let Some(rest) = rest.trim_start().strip_prefix('-') {
            return rest.trim_start();
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_lowercases() {
        assert_eq!(normalize("  Torre A \t"), "torre a");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for input in ["  MiXeD Case  ", "ÁGUA Viva", "\n\tx\n", "", "already clean"] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_campaign_name_strips_prefix() {
        assert_eq!(
            normalize_campaign_name("Simulação de Financiamento - Torre A"),
            "torre a"
        );
        assert_eq!(
            normalize_campaign_name("SIMULACAO DE FINANCIAMENTO-Torre A"),
            "torre a"
        );
        assert_eq!(
            normalize_campaign_name("simulaçao de financiamento   -   Torre B"),
            "torre b"
        );
    }

    #[test]
    fn test_campaign_name_requires_separator() {
        // Without the dash the phrase is part of the name
        assert_eq!(
            normalize_campaign_name("Simulação de Financiamento Torre A"),
            "simulação de financiamento torre a"
        );
    }

    #[test]
    fn test_campaign_name_collapses_whitespace() {
        assert_eq!(normalize_campaign_name("  Torre   A\t\tNorte "), "torre a norte");
        assert_eq!(normalize_campaign_name(""), "");
    }
}

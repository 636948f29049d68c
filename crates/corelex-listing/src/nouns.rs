use corelex_types::{CorelexType, Noun};

/// Nouns filed under one polysemous type of a CoreLex type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NounGroup<'a> {
    pub polysemous_type: &'a str,
    pub nouns: Vec<&'a str>,
}

/// One group per row, in row order, each holding the nouns whose polysemous
/// type equals the row's (noun order preserved).
pub fn group_nouns_by_polysemous_type<'a>(
    rows: &[CorelexType<'a>],
    nouns: &[Noun<'a>],
) -> Vec<NounGroup<'a>> {
    rows.iter()
        .map(|row| NounGroup {
            polysemous_type: row.polysemous_type,
            nouns: nouns
                .iter()
                .filter(|noun| noun.polysemous_type == row.polysemous_type)
                .map(|noun| noun.noun)
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noun(noun: &'static str, polysemous_type: &'static str) -> Noun<'static> {
        Noun {
            noun,
            polysemous_type,
            corelex_type: "acr",
        }
    }

    #[test]
    fn groups_nouns_under_each_row() {
        let rows = [
            CorelexType {
                corelex_type: "acr",
                polysemous_type: "act rel",
            },
            CorelexType {
                corelex_type: "acr",
                polysemous_type: "act evt rel",
            },
            CorelexType {
                corelex_type: "acr",
                polysemous_type: "act rel sta",
            },
        ];
        let nouns = [
            noun("dealing", "act rel"),
            noun("contact", "act evt rel"),
            noun("intercourse", "act rel"),
        ];
        let groups = group_nouns_by_polysemous_type(&rows, &nouns);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].nouns, vec!["dealing", "intercourse"]);
        assert_eq!(groups[1].nouns, vec!["contact"]);
        assert!(groups[2].nouns.is_empty());
        assert_eq!(groups[2].polysemous_type, "act rel sta");
    }
}

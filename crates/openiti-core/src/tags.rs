use std::collections::HashMap;

/// Normalised source-library tags per version ID (`id\ttag;tag` lines).
#[derive(Debug, Clone, Default)]
pub struct TagTable {
    tags: HashMap<String, String>,
}

impl TagTable {
    pub fn parse(content: &str) -> Self {
        let tags = content
            .lines()
            .filter_map(|line| line.split_once('\t'))
            .map(|(id, tags)| (id.trim().to_string(), tags.trim().replace(';', " :: ")))
            .filter(|(id, _)| !id.is_empty())
            .collect();
        Self { tags }
    }

    pub fn get(&self, version_id: &str) -> Option<&str> {
        self.tags.get(version_id).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let table = TagTable::parse("Shamela0001\tADAB;_SHAM_HADITH\nbroken line\n");
        assert_eq!(table.get("Shamela0001"), Some("ADAB :: _SHAM_HADITH"));
        assert_eq!(table.get("broken line"), None);
    }
}

//! Context accumulation
//!
//! Folds previously generated documents into the idea text handed to the next
//! stage. Pure functions: the base data is never modified, a derived copy is returned.

use super::{DocumentSet, ProjectData};

const CONTEXT_HEADER: &str = "=== PREVIOUSLY GENERATED DOCUMENTATION ===";

/// Documents generated so far, keyed by category in generation order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriorDocuments {
    categories: Vec<(String, DocumentSet)>,
}

impl PriorDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a category, or extend it if already present
    pub fn push(&mut self, category: impl Into<String>, documents: DocumentSet) {
        let category = category.into();
        match self.categories.iter_mut().find(|(name, _)| *name == category) {
            Some((_, existing)) => {
                for (filename, content) in documents {
                    existing.insert(filename, content);
                }
            }
            None => self.categories.push((category, documents)),
        }
    }

    pub fn get(&self, category: &str) -> Option<&DocumentSet> {
        self.categories
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, docs)| docs)
    }

    /// Category names in generation order
    pub fn categories(&self) -> Vec<&str> {
        self.categories.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DocumentSet)> {
        self.categories.iter().map(|(name, docs)| (name.as_str(), docs))
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Build the augmented input for a stage from the base data and every prior category.
///
/// The returned idea text starts with the original idea verbatim, followed by one
/// labelled section per category and one labelled subsection per file, both in
/// insertion order. Questions and answers pass through unchanged.
pub fn enhance(base: &ProjectData, prior: &PriorDocuments) -> ProjectData {
    if prior.is_empty() {
        return base.clone();
    }

    let mut text = String::from(base.project_idea());
    text.push_str("\n\n");
    text.push_str(CONTEXT_HEADER);

    for (category, documents) in prior.iter() {
        push_category(&mut text, category, documents);
    }

    base.with_idea(text)
}

/// Single-category variant: fold in only one category's documents
pub fn enhance_single(base: &ProjectData, category: &str, documents: &DocumentSet) -> ProjectData {
    let mut prior = PriorDocuments::new();
    prior.push(category, documents.clone());
    enhance(base, &prior)
}

fn push_category(text: &mut String, category: &str, documents: &DocumentSet) {
    text.push_str("\n\n## ");
    text.push_str(&category.to_uppercase());
    text.push_str(" DOCUMENTS");

    for (filename, content) in documents.iter() {
        text.push_str("\n\n### ");
        text.push_str(filename);
        text.push('\n');
        text.push_str(content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base() -> ProjectData {
        ProjectData::new("A recipe app", vec!["Who?".into()], vec!["Cooks".into()]).unwrap()
    }

    #[test]
    fn test_no_prior_documents_is_identity() {
        assert_eq!(enhance(&base(), &PriorDocuments::new()), base());
    }

    #[test]
    fn test_layout() {
        let mut prior = PriorDocuments::new();
        prior.push("context", DocumentSet::single("context.md", "# Context\nbody"));

        let enhanced = enhance(&base(), &prior);
        assert_eq!(
            enhanced.project_idea(),
            "A recipe app\n\n=== PREVIOUSLY GENERATED DOCUMENTATION ===\n\n## CONTEXT DOCUMENTS\n\n### context.md\n# Context\nbody"
        );
        assert_eq!(enhanced.questions(), base().questions());
        assert_eq!(enhanced.answers(), base().answers());
    }

    #[test]
    fn test_preserves_generation_order_not_sorted() {
        let mut prior = PriorDocuments::new();
        prior.push("tech_stack", DocumentSet::single("z.md", "ZZZ"));
        let mut arch = DocumentSet::single("b.md", "BBB");
        arch.insert("a.md", "AAA");
        prior.push("architecture", arch);

        let text = enhance(&base(), &prior).project_idea().to_string();
        let z = text.find("ZZZ").unwrap();
        let b = text.find("BBB").unwrap();
        let a = text.find("AAA").unwrap();
        assert!(z < b && b < a);
        assert!(text.starts_with("A recipe app"));
    }

    #[test]
    fn test_single_matches_general_form() {
        let docs = DocumentSet::single("context.md", "ctx");
        let mut prior = PriorDocuments::new();
        prior.push("context", docs.clone());
        assert_eq!(enhance_single(&base(), "context", &docs), enhance(&base(), &prior));
    }

    #[test]
    fn test_push_extends_existing_category() {
        let mut prior = PriorDocuments::new();
        prior.push("context", DocumentSet::single("a.md", "1"));
        prior.push("context", DocumentSet::single("b.md", "2"));
        assert_eq!(prior.len(), 1);
        assert_eq!(prior.get("context").unwrap().len(), 2);
    }
}

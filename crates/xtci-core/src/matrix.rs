use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// One tag of the build matrix: a compiler pair plus the upstream modules
/// removed from the image before building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixEntry {
    /// C compiler
    pub cc: String,
    /// C++ compiler
    pub cxx: String,
    /// Space-separated list of modules to delete
    #[serde(default)]
    pub deletes: String,
}

impl MatrixEntry {
    pub fn new(cc: &str, cxx: &str, deletes: &str) -> Self {
        Self {
            cc: cc.to_owned(),
            cxx: cxx.to_owned(),
            deletes: deletes.to_owned(),
        }
    }

    pub fn compilers(&self) -> CompilerPair {
        CompilerPair {
            cc: self.cc.clone(),
            cxx: self.cxx.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompilerPair {
    pub cc: String,
    pub cxx: String,
}

/// Tag name → matrix entry. Iterates in tag order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagMatrix(BTreeMap<String, MatrixEntry>);

impl TagMatrix {
    pub fn new(entries: impl IntoIterator<Item = (String, MatrixEntry)>) -> Self {
        Self(entries.into_iter().collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MatrixEntry)> {
        self.0.iter().map(|(tag, entry)| (tag.as_str(), entry))
    }

    pub fn get(&self, tag: &str) -> Option<&MatrixEntry> {
        self.0.get(tag)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Distinct compiler pairs across all tags; one base image is built per pair.
    pub fn compiler_pairs(&self) -> BTreeSet<CompilerPair> {
        self.0.values().map(MatrixEntry::compilers).collect()
    }

    /// Reject tags that cannot appear in a docker repository name.
    pub fn validate(&self) -> crate::Result<()> {
        if self.is_empty() {
            return Err(crate::Error::EmptyMatrix);
        }
        for tag in self.0.keys() {
            validate_tag(tag)?;
        }
        Ok(())
    }
}

impl Default for TagMatrix {
    fn default() -> Self {
        Self::new([
            ("gcc_full".to_owned(), MatrixEntry::new("gcc", "g++", "")),
            (
                "gcc_no_istl_no_disc".to_owned(),
                MatrixEntry::new(
                    "gcc",
                    "g++",
                    "dune-fem dune-pdelab dune-functions dune-typetree dune-istl",
                ),
            ),
            (
                "gcc_no_disc".to_owned(),
                MatrixEntry::new("gcc", "g++", "dune-fem dune-pdelab"),
            ),
            (
                "clang_full".to_owned(),
                MatrixEntry::new("clang", "clang++", ""),
            ),
        ])
    }
}

fn validate_tag(tag: &str) -> crate::Result<()> {
    let invalid = |reason| crate::Error::InvalidTag {
        tag: tag.to_owned(),
        reason,
    };

    if tag.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if !tag
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.'))
    {
        return Err(invalid(
            "only lowercase letters, digits, '_', '-' and '.' are allowed",
        ));
    }
    if !tag.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        return Err(invalid("must start with a letter or digit"));
    }
    Ok(())
}

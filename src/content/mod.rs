//! Portfolio content
//!
//! Everything shown on the page is static data. A copy is compiled into the
//! binary from `content/portfolio.toml`; a different file can be loaded at
//! runtime through the `[content]` config section.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

mod types;

pub use types::{
    ContactInfo, Experience, PersonalInfo, Project, ProjectCategory, Skill, SkillCategory, SocialLink,
};

const BUNDLED: &str = include_str!("../../content/portfolio.toml");

/// Errors loading content
#[derive(Debug, Error)]
pub enum ContentError {
    /// File could not be read
    #[error("failed to read content file {path}: {source}")]
    Io {
        /// Content path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid content TOML
    #[error("failed to parse content: {0}")]
    Parse(#[from] toml::de::Error),

    /// Two records in one list share an id
    #[error("duplicate {list} id `{id}`")]
    DuplicateId {
        /// List containing the duplicate
        list: &'static str,
        /// Repeated id
        id: String,
    },

    /// A skill level outside 0..=100
    #[error("skill `{name}` has level {level}, expected 0-100")]
    SkillLevel {
        /// Skill name
        name: String,
        /// Level found
        level: u8,
    },

    /// A required field is blank
    #[error("`{0}` must not be empty")]
    Missing(&'static str),
}

/// The complete page content, in display order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    /// Hero and about
    pub personal: PersonalInfo,
    /// Contact section
    pub contact: ContactInfo,
    /// Work timeline, most recent first
    #[serde(default)]
    pub experience: Vec<Experience>,
    /// Project showcase
    #[serde(default)]
    pub projects: Vec<Project>,
    /// Skill categories
    #[serde(default)]
    pub skills: Vec<SkillCategory>,
}

impl Portfolio {
    /// Content compiled into the binary
    pub fn bundled() -> Result<Self, ContentError> {
        Self::from_toml(BUNDLED)
    }

    /// Parse and validate content TOML
    pub fn from_toml(source: &str) -> Result<Self, ContentError> {
        let portfolio: Self = toml::from_str(source)?;
        portfolio.validate()?;
        debug!(
            "Content: {} experience, {} projects, {} skill categories",
            portfolio.experience.len(),
            portfolio.projects.len(),
            portfolio.skills.len()
        );
        Ok(portfolio)
    }

    /// Load content from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ContentError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let portfolio = Self::from_toml(&source)?;
        info!("Loaded content from {}", path.display());
        Ok(portfolio)
    }

    /// Projects flagged for the showcase
    pub fn featured_projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter().filter(|p| p.featured)
    }

    /// Projects in `category`
    pub fn projects_by_category(&self, category: ProjectCategory) -> impl Iterator<Item = &Project> {
        self.projects.iter().filter(move |p| p.category == category)
    }

    /// Check ids, levels and required fields
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.personal.name.trim().is_empty() {
            return Err(ContentError::Missing("personal.name"));
        }
        if self.contact.email.trim().is_empty() {
            return Err(ContentError::Missing("contact.email"));
        }

        unique_ids("experience", self.experience.iter().map(|e| e.id.as_str()))?;
        unique_ids("project", self.projects.iter().map(|p| p.id.as_str()))?;
        unique_ids("skill category", self.skills.iter().map(|s| s.id.as_str()))?;

        for skill in self.skills.iter().flat_map(|c| &c.skills) {
            if skill.level > 100 {
                return Err(ContentError::SkillLevel {
                    name: skill.name.clone(),
                    level: skill.level,
                });
            }
        }
        Ok(())
    }
}

fn unique_ids<'a>(list: &'static str, ids: impl Iterator<Item = &'a str>) -> Result<(), ContentError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ContentError::DuplicateId {
                list,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [personal]
        name = "Ada"
        title = "Engineer"
        bio = "bio"
        tagline = "tagline"
        location = "London"
        email = "ada@example.com"
        image = "/ada.jpg"

        [contact]
        email = "ada@example.com"
        location = "London"
        resume_url = "/cv.pdf"
    "#;

    #[test]
    fn test_bundled_content_is_valid() {
        let portfolio = Portfolio::bundled().unwrap();
        assert_eq!(portfolio.personal.name, "Mantej Singh Dhanjal");
        assert_eq!(portfolio.experience.len(), 6);
        assert_eq!(portfolio.experience[0].company, "Verizon");
        assert_eq!(portfolio.featured_projects().count(), 6);
        assert_eq!(portfolio.skills.len(), 6);
        assert_eq!(portfolio.contact.social_links.len(), 4);
    }

    #[test]
    fn test_projects_by_category() {
        let portfolio = Portfolio::bundled().unwrap();
        let ai: Vec<_> = portfolio
            .projects_by_category(ProjectCategory::Ai)
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ai, ["promptfoo-contrib", "jarvis-assistant", "jarvis-speech", "nlp-project"]);
        assert_eq!(portfolio.projects_by_category(ProjectCategory::Web).count(), 0);
    }

    #[test]
    fn test_minimal_defaults() {
        let portfolio = Portfolio::from_toml(MINIMAL).unwrap();
        assert!(portfolio.projects.is_empty());
        assert_eq!(portfolio.contact.phone, None);
    }

    #[test]
    fn test_duplicate_project_id() {
        let source = format!(
            "{}{}",
            MINIMAL,
            r#"
            [[projects]]
            id = "x"
            title = "X"
            description = "d"
            technologies = []
            github_url = "https://example.com"
            category = "web"

            [[projects]]
            id = "x"
            title = "Y"
            description = "d"
            technologies = []
            github_url = "https://example.com"
            category = "other"
            "#
        );
        assert!(matches!(
            Portfolio::from_toml(&source),
            Err(ContentError::DuplicateId { list: "project", .. })
        ));
    }

    #[test]
    fn test_skill_level_range() {
        let source = format!(
            "{}{}",
            MINIMAL,
            r#"
            [[skills]]
            id = "s"
            title = "S"
            description = "d"
            skills = [{ name = "Overconfidence", level = 140, experience = "forever" }]
            "#
        );
        assert!(matches!(
            Portfolio::from_toml(&source),
            Err(ContentError::SkillLevel { level: 140, .. })
        ));
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("data-science".parse::<ProjectCategory>().unwrap(), ProjectCategory::DataScience);
        assert!("games".parse::<ProjectCategory>().is_err());
    }
}

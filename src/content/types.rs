//! Content records

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Who the page is about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    /// Full name shown in the hero
    pub name: String,
    /// Job title under the name
    pub title: String,
    /// Paragraph for the about section
    pub bio: String,
    /// One-line pitch
    pub tagline: String,
    /// City and country
    pub location: String,
    /// Public email address
    pub email: String,
    /// Portrait path or URL
    pub image: String,
}

/// Link shown in the contact section and footer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    /// Service name, e.g. `GitHub`
    pub platform: String,
    /// Profile URL
    pub url: String,
    /// Icon identifier (font-awesome name)
    pub icon: String,
    /// Accessible label
    pub label: String,
}

/// Contact details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    /// Recipient for the contact form
    pub email: String,
    /// Optional phone number
    #[serde(default)]
    pub phone: Option<String>,
    /// Where the person is based
    pub location: String,
    /// Profiles linked from the contact section
    #[serde(default)]
    pub social_links: Vec<SocialLink>,
    /// Booking page, when offered
    #[serde(default)]
    pub calendly_url: Option<String>,
    /// Downloadable resume
    pub resume_url: String,
}

/// One position in the work timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    /// Unique identifier, used in element keys
    pub id: String,
    /// Employer
    pub company: String,
    /// Position held
    pub role: String,
    /// Free-form date range, e.g. `2022 - Present`
    pub period: String,
    /// Office location or `Remote`
    pub location: String,
    /// Bullet points describing the work
    pub description: Vec<String>,
    /// Technology tags
    pub technologies: Vec<String>,
    /// Company logo path or URL
    pub image: String,
    /// Highlighted outcomes
    #[serde(default)]
    pub achievements: Vec<String>,
}

/// Project grouping used for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectCategory {
    /// Analysis and machine learning
    DataScience,
    /// Scripts and tooling
    Automation,
    /// Websites and web apps
    Web,
    /// AI products
    Ai,
    /// Security and cryptography
    Cryptography,
    /// Anything else
    Other,
}

impl ProjectCategory {
    /// Every category in display order
    pub const ALL: [ProjectCategory; 6] = [
        Self::DataScience,
        Self::Automation,
        Self::Web,
        Self::Ai,
        Self::Cryptography,
        Self::Other,
    ];

    /// Identifier used in content files and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DataScience => "data-science",
            Self::Automation => "automation",
            Self::Web => "web",
            Self::Ai => "ai",
            Self::Cryptography => "cryptography",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ProjectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown project category: {}", s))
    }
}

/// A showcased project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier, used in element keys
    pub id: String,
    /// Card heading
    pub title: String,
    /// Short summary on the card
    pub description: String,
    /// Extended write-up
    #[serde(default)]
    pub long_description: Option<String>,
    /// Technology tags
    pub technologies: Vec<String>,
    /// Source repository
    pub github_url: String,
    /// Deployed demo, if any
    #[serde(default)]
    pub live_url: Option<String>,
    /// Screenshot path or URL
    #[serde(default)]
    pub image: Option<String>,
    /// Pinned to the front of the list
    #[serde(default)]
    pub featured: bool,
    /// Filter group
    pub category: ProjectCategory,
}

/// A skill with a self-assessed level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    /// Display name
    pub name: String,
    /// Percentage, 0 to 100
    pub level: u8,
    /// Time spent with it, e.g. `3+ years`
    pub experience: String,
}

/// Group of related skills
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCategory {
    /// Unique identifier, used in element keys
    pub id: String,
    /// Card heading
    pub title: String,
    /// Line under the heading
    pub description: String,
    /// Skills in display order
    pub skills: Vec<Skill>,
}

impl SkillCategory {
    /// Mean level across the category, 0 when empty
    ///
    /// ```
    /// use prism_folio::content::{Skill, SkillCategory};
    ///
    /// let category = SkillCategory {
    ///     id: "lang".into(),
    ///     title: "Languages".into(),
    ///     description: String::new(),
    ///     skills: vec![
    ///         Skill { name: "Rust".into(), level: 90, experience: "3 years".into() },
    ///         Skill { name: "Go".into(), level: 70, experience: "1 year".into() },
    ///     ],
    /// };
    /// assert_eq!(category.average_level(), 80.0);
    /// ```
    pub fn average_level(&self) -> f32 {
        if self.skills.is_empty() {
            return 0.0;
        }
        let total: u32 = self.skills.iter().map(|s| u32::from(s.level)).sum();
        total as f32 / self.skills.len() as f32
    }
}

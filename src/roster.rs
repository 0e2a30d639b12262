use crate::{wikitext, Error, Lookup, Mediawiki};
use regex::Regex;
use serde::Deserialize;
use std::{fmt, sync::LazyLock};
use tracing::info;

pub const SENATE_PAGE: &str = "List of current United States Senators";
pub const SENATE_SECTION: &str = "Senators";
pub const HOUSE_PAGE: &str = "Current members of the United States House of Representatives";
pub const HOUSE_SECTION: &str = "Voting members by state";

// {{sortname|FIRST|LAST[|ARTICLE][|...]}}; trailing sort keys and dab= are ignored.
static SORTNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{[Ss]ortname\|([^|{}\n]+)\|([^|{}\n]+)(?:\|([^|{}\n]*))?(?:\|[^{}\n]*)?\}\}")
        .expect("valid regex")
});

/// A listing page and the section of it that holds a roster.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterSource {
    pub page: String,
    pub section: String,
    pub label: String,
}
impl RosterSource {
    pub fn senate() -> RosterSource {
        RosterSource {
            page: SENATE_PAGE.into(),
            section: SENATE_SECTION.into(),
            label: "senators".into(),
        }
    }
    pub fn house() -> RosterSource {
        RosterSource {
            page: HOUSE_PAGE.into(),
            section: HOUSE_SECTION.into(),
            label: "representatives".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Member {
    pub first: String,
    pub last: String,
    pub article: Option<String>,
}
impl Member {
    pub fn new(first: &str, last: &str, article: Option<&str>) -> Member {
        Member {
            first: first.into(),
            last: last.into(),
            article: article.map(Into::into),
        }
    }
    /// Title of the member's biography.
    pub fn article_title(&self) -> String {
        match &self.article {
            Some(article) => article.clone(),
            None => format!("{} {}", self.first, self.last),
        }
    }
    pub fn file_name(&self) -> String {
        format!(
            "us_congress_portrait_{}_{}.jpg",
            self.last.to_lowercase(),
            self.first.to_lowercase()
        )
    }
}
impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}, {}", self.last, self.first)
    }
}

/// Every sortname citation in `text`, in document order.
pub fn members(text: &str) -> Vec<Member> {
    SORTNAME
        .captures_iter(text)
        .map(|caps| {
            let article = caps
                .get(3)
                .map(|article| article.as_str().trim())
                .filter(|article| !article.is_empty());
            Member::new(caps[1].trim(), caps[2].trim(), article)
        })
        .collect()
}

pub trait Roster {
    fn query_members(&self, page: &str, section: &str) -> Result<Vec<Member>, Error>;
}
impl Roster for Mediawiki {
    fn query_members(&self, page: &str, section: &str) -> Result<Vec<Member>, Error> {
        let text = self.query_article(page)?;
        let found = Lookup::exactly_one(wikitext::sections(&text, section)).found(
            format!("section {section:?} on {page:?}"),
            || {
                let titles: Vec<_> = wikitext::headings(&text)
                    .into_iter()
                    .map(|heading| heading.title)
                    .collect();
                format!("headings = {titles:?}")
            },
        )?;
        let members = members(found);
        info!(page, section, count = members.len(), "loaded roster");
        Ok(members)
    }
}

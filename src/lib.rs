// Copyright © 2016, Peter Atashian
//! Downloads the portraits of the members of the current U.S. Congress from
//! Wikipedia through the MediaWiki action API.

pub mod batch;
pub mod imageinfo;
pub mod infobox;
pub mod portrait;
pub mod roster;
pub mod wikitext;

use reqwest::blocking::Client;
use roster::RosterSource;
use serde::Deserialize;
pub use serde_json::Value as Json;
use serde_json::Map;
use std::{
    fs,
    io::Error as IoError,
    path::{Path, PathBuf},
};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unexpected response: {0}")]
    Json(Json),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] IoError),
    #[error(transparent)]
    Parse(#[from] serde_json::Error),
    #[error("no {what} found\n{context}")]
    NotFound { what: String, context: String },
    #[error("expected one {what}, found {count}\n{context}")]
    Ambiguous {
        what: String,
        count: usize,
        context: String,
    },
    #[error("cannot load config {path:?}: {message}")]
    Config { path: PathBuf, message: String },
}
impl From<Json> for Error {
    fn from(err: Json) -> Error {
        Error::Json(err)
    }
}
impl Error {
    /// True when the wiki content no longer has the shape the pipeline
    /// expects, as opposed to a transport or filesystem failure.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::Json(_) | Error::NotFound { .. } | Error::Ambiguous { .. }
        )
    }
}

/// Outcome of a search that must turn up exactly one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    Ambiguous(usize),
}
impl<T> Lookup<T> {
    pub fn exactly_one<I: IntoIterator<Item = T>>(items: I) -> Lookup<T> {
        let mut items = items.into_iter();
        match (items.next(), items.next()) {
            (None, _) => Lookup::NotFound,
            (Some(item), None) => Lookup::Found(item),
            (Some(_), Some(_)) => Lookup::Ambiguous(2 + items.count()),
        }
    }
    /// Converts the outcome into a structural error unless exactly one
    /// candidate was found. `context` is only rendered on failure.
    pub fn found(
        self,
        what: impl Into<String>,
        context: impl FnOnce() -> String,
    ) -> Result<T, Error> {
        match self {
            Lookup::Found(item) => Ok(item),
            Lookup::NotFound => Err(Error::NotFound {
                what: what.into(),
                context: context(),
            }),
            Lookup::Ambiguous(count) => Err(Error::Ambiguous {
                what: what.into(),
                count,
                context: context(),
            }),
        }
    }
}

pub trait JsonFun<'a> {
    fn field(self, key: &str) -> Result<&'a Json, Error>;
    fn string(self) -> Result<&'a str, Error>;
    fn array(self) -> Result<&'a Vec<Json>, Error>;
    fn object(self) -> Result<&'a Map<String, Json>, Error>;
}
impl<'a> JsonFun<'a> for &'a Json {
    fn field(self, key: &str) -> Result<&'a Json, Error> {
        self.get(key).ok_or_else(|| self.clone().into())
    }
    fn string(self) -> Result<&'a str, Error> {
        self.as_str().ok_or_else(|| self.clone().into())
    }
    fn array(self) -> Result<&'a Vec<Json>, Error> {
        self.as_array().ok_or_else(|| self.clone().into())
    }
    fn object(self) -> Result<&'a Map<String, Json>, Error> {
        self.as_object().ok_or_else(|| self.clone().into())
    }
}
impl<'a> JsonFun<'a> for Result<&'a Json, Error> {
    fn field(self, key: &str) -> Result<&'a Json, Error> {
        self.and_then(|x| x.field(key))
    }
    fn string(self) -> Result<&'a str, Error> {
        self.and_then(|x| x.string())
    }
    fn array(self) -> Result<&'a Vec<Json>, Error> {
        self.and_then(|x| x.array())
    }
    fn object(self) -> Result<&'a Map<String, Json>, Error> {
        self.and_then(|x| x.object())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub baseapi: String,
    pub useragent: String,
    pub follow_redirects: bool,
    pub rosters: Vec<RosterSource>,
}
impl Default for Config {
    fn default() -> Config {
        Config {
            baseapi: "https://en.wikipedia.org/w/api.php".into(),
            useragent: concat!("congress-portraits/", env!("CARGO_PKG_VERSION")).into(),
            follow_redirects: true,
            rosters: vec![RosterSource::senate(), RosterSource::house()],
        }
    }
}
impl Config {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Config, Error> {
        let path = path.as_ref();
        let failed = |message: String| Error::Config {
            path: path.to_owned(),
            message,
        };
        let text = fs::read_to_string(path).map_err(|e| failed(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| failed(e.to_string()))
    }
}

pub struct Mediawiki {
    client: Client,
    config: Config,
}
impl Mediawiki {
    pub fn new(config: Config) -> Result<Mediawiki, Error> {
        let client = Client::builder()
            .user_agent(config.useragent.clone())
            .build()?;
        Ok(Mediawiki { client, config })
    }
    pub fn from_path(path: impl AsRef<Path>) -> Result<Mediawiki, Error> {
        Mediawiki::new(Config::from_path(path)?)
    }
    pub fn config(&self) -> &Config {
        &self.config
    }
    pub fn request(&self) -> RequestBuilder<'_> {
        let mut request = RequestBuilder {
            mw: self,
            args: Vec::new(),
        };
        request.arg("format", "json");
        request
    }
    /// Text of the latest revision of the article `title`.
    pub fn query_article(&self, title: &str) -> Result<String, Error> {
        let mut request = self.request();
        request.arg("action", "query");
        request.arg("prop", "revisions");
        request.arg("rvprop", "timestamp|user|comment|content");
        request.arg("titles", format!("API|{title}"));
        if self.config.follow_redirects {
            request.arg("redirects", "");
        }
        let json = request.get()?;
        let page = page_titled(&json, &resolve_title(&json, title))?;
        if page.get("missing").is_some() {
            return Err(Error::NotFound {
                what: format!("article {title:?}"),
                context: page.to_string(),
            });
        }
        let revision = page
            .field("revisions")
            .array()?
            .last()
            .ok_or_else(|| Error::NotFound {
                what: format!("revision of {title:?}"),
                context: page.to_string(),
            })?;
        let text = revision
            .field("*")
            .or_else(|_| revision.field("content"))
            .string()?;
        Ok(text.to_owned())
    }
}

pub struct RequestBuilder<'a> {
    mw: &'a Mediawiki,
    args: Vec<(String, String)>,
}
impl<'a> RequestBuilder<'a> {
    pub fn arg(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.args.push((name.into(), value.into()));
    }
    pub fn get(&self) -> Result<Json, Error> {
        debug!(args = ?self.args, "api request");
        let response = self
            .mw
            .client
            .get(&self.mw.config.baseapi)
            .query(&self.args)
            .send()?
            .error_for_status()?;
        let body = response.text()?;
        let json: Json = serde_json::from_str(&body)?;
        if let Some(error) = json.get("error") {
            return Err(error.clone().into());
        }
        Ok(json)
    }
}

/// Follows the `normalized` and then the `redirects` mappings of a query
/// response, starting from the title that was asked for.
pub fn resolve_title(json: &Json, title: &str) -> String {
    let mut title = title.to_owned();
    for key in ["normalized", "redirects"] {
        let mappings = json
            .get("query")
            .and_then(|query| query.get(key))
            .and_then(Json::as_array);
        let to = mappings
            .into_iter()
            .flatten()
            .find(|mapping| mapping.get("from").and_then(Json::as_str) == Some(title.as_str()))
            .and_then(|mapping| mapping.get("to"))
            .and_then(Json::as_str);
        if let Some(to) = to {
            debug!(from = %title, to, "{key} title");
            title = to.to_owned();
        }
    }
    title
}

/// The single page of a query response whose title is `title`.
pub fn page_titled<'a>(json: &'a Json, title: &str) -> Result<&'a Json, Error> {
    let pages = json.field("query").field("pages").object()?;
    Lookup::exactly_one(
        pages
            .values()
            .filter(|page| page.get("title").and_then(Json::as_str) == Some(title)),
    )
    .found(format!("page titled {title:?}"), || format!("response = {json}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_counts_candidates() {
        assert_eq!(Lookup::exactly_one(Vec::<u8>::new()), Lookup::NotFound);
        assert_eq!(Lookup::exactly_one(vec![7]), Lookup::Found(7));
        assert_eq!(Lookup::exactly_one(vec![1, 2, 3]), Lookup::Ambiguous(3));
    }

    #[test]
    fn failed_lookup_is_structural() {
        let err = Lookup::exactly_one(vec![1, 2])
            .found("infobox", || "ctx".into())
            .unwrap_err();
        assert!(err.is_structural());
        assert!(err.to_string().contains("expected one infobox, found 2"));
        let err = Lookup::<u8>::NotFound
            .found("page", || "ctx".into())
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn resolve_title_applies_normalization_then_redirect() {
        let json = json!({"query": {
            "normalized": [{"from": "jane doe", "to": "Jane doe"}],
            "redirects": [{"from": "Jane doe", "to": "Jane Doe"}],
            "pages": {}
        }});
        assert_eq!(resolve_title(&json, "jane doe"), "Jane Doe");
        assert_eq!(resolve_title(&json, "Other"), "Other");
    }

    #[test]
    fn page_titled_filters_by_title() {
        let json = json!({"query": {"pages": {
            "1": {"title": "API"},
            "2": {"title": "Jane Doe", "pageid": 2}
        }}});
        let page = page_titled(&json, "Jane Doe").unwrap();
        assert_eq!(page["pageid"], 2);
        assert!(page_titled(&json, "John Roe").unwrap_err().is_structural());
    }

    #[test]
    fn json_fun_reports_offending_value() {
        let json = json!({"query": {"pages": []}});
        let err = json.field("continue").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
        let err = json.field("query").field("pages").object().unwrap_err();
        match err {
            Error::Json(value) => assert_eq!(value, json!([])),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn config_fields_default_individually() {
        let config: Config =
            serde_json::from_str(r#"{"baseapi": "http://localhost/api.php"}"#).unwrap();
        assert_eq!(config.baseapi, "http://localhost/api.php");
        assert!(config.follow_redirects);
        assert_eq!(config.rosters.len(), 2);
        assert_eq!(config.rosters[0].section, "Senators");
    }

    #[test]
    fn missing_config_file_is_reported() {
        let err = Config::from_path("does/not/exist.json").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}

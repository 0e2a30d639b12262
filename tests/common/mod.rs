#![allow(dead_code)]

use congress_portraits::{roster::RosterSource, Config, Json, Mediawiki};
use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

pub const API_PATH: &str = "/w/api.php";

/// A mock wiki. The server runs on its own runtime so the blocking client
/// can be driven from the test thread.
pub struct Wiki {
    pub server: MockServer,
    runtime: Runtime,
}
impl Wiki {
    pub fn start() -> Wiki {
        let runtime = Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        Wiki { server, runtime }
    }
    pub fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }
    pub fn config(&self, rosters: Vec<RosterSource>) -> Config {
        Config {
            baseapi: format!("{}{API_PATH}", self.server.uri()),
            rosters,
            ..Config::default()
        }
    }
    pub fn mediawiki(&self, rosters: Vec<RosterSource>) -> Mediawiki {
        Mediawiki::new(self.config(rosters)).unwrap()
    }
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.server.uri())
    }
    /// Serves `response` to the revisions query for `title`.
    pub fn revisions(&self, title: &str, response: Json) {
        self.mount(
            Mock::given(method("GET"))
                .and(path(API_PATH))
                .and(query_param("prop", "revisions"))
                .and(query_param("titles", format!("API|{title}")))
                .respond_with(ResponseTemplate::new(200).set_body_json(response)),
        );
    }
    /// Serves `text` as the latest revision of `title`.
    pub fn article(&self, title: &str, text: &str) {
        self.revisions(title, article_response(title, title, text));
    }
    /// Serves `response` to the imageinfo query for `File:<file_name>`.
    pub fn imageinfo(&self, file_name: &str, response: Json) {
        self.mount(
            Mock::given(method("GET"))
                .and(path(API_PATH))
                .and(query_param("prop", "imageinfo"))
                .and(query_param("titles", format!("API|File:{file_name}")))
                .respond_with(ResponseTemplate::new(200).set_body_json(response)),
        );
    }
    /// Serves an image at `image_path` and points `File:<file_name>` to it.
    pub fn image(&self, file_name: &str, image_path: &str, bytes: &[u8]) {
        let title = format!("File:{file_name}");
        self.imageinfo(file_name, imageinfo_response(&title, &self.url(image_path)));
        self.mount(
            Mock::given(method("GET"))
                .and(path(image_path))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.to_vec())),
        );
    }
    /// Serves a portrait for the biography `title` through the whole chain.
    pub fn portrait(&self, title: &str, file_name: &str, image_path: &str, bytes: &[u8]) {
        self.article(
            title,
            &format!("{{{{Infobox officeholder\n| name = {title}\n| image = {file_name}\n}}}}\n'''{title}''' is a politician."),
        );
        self.image(file_name, image_path, bytes);
    }
}

fn api_page() -> Json {
    json!({
        "pageid": 1,
        "ns": 0,
        "title": "API",
        "revisions": [{"user": "Bot", "timestamp": "2016-01-01T00:00:00Z", "comment": "", "*": "#REDIRECT [[MediaWiki]]"}]
    })
}

/// Revisions response for a request of `requested` answered by the page
/// `title`, with a normalization entry when the two differ.
pub fn article_response(requested: &str, title: &str, text: &str) -> Json {
    let mut query = json!({
        "pages": {
            "1": api_page(),
            "42": {
                "pageid": 42,
                "ns": 0,
                "title": title,
                "revisions": [
                    {"user": "Editor", "timestamp": "2016-01-01T00:00:00Z", "comment": "old", "*": "stale text"},
                    {"user": "Editor", "timestamp": "2016-02-01T00:00:00Z", "comment": "new", "*": text}
                ]
            }
        }
    });
    if requested != title {
        query["normalized"] = json!([{"from": requested, "to": title}]);
    }
    json!({"batchcomplete": "", "query": query})
}

pub fn imageinfo_response(title: &str, url: &str) -> Json {
    json!({
        "batchcomplete": "",
        "query": {
            "pages": {
                "-1": {
                    "ns": 6,
                    "title": title,
                    "missing": "",
                    "known": "",
                    "imagerepository": "shared",
                    "imageinfo": [{"url": url, "descriptionurl": "https://commons.example/wiki/x"}]
                },
                "1": {"pageid": 1, "ns": 0, "title": "API"}
            }
        }
    })
}

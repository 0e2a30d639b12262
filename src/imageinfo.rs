use crate::{page_titled, resolve_title, Error, Json, JsonFun, Lookup, Mediawiki};
use tracing::debug;

pub trait ImageInfo {
    /// Direct URL of the file `file_name`, given without the `File:` prefix.
    fn query_image_url(&self, file_name: &str) -> Result<String, Error>;
}
impl ImageInfo for Mediawiki {
    fn query_image_url(&self, file_name: &str) -> Result<String, Error> {
        let query_title = format!("File:{file_name}");
        let mut request = self.request();
        request.arg("action", "query");
        request.arg("prop", "imageinfo");
        request.arg("iiprop", "url");
        request.arg("titles", format!("API|{query_title}"));
        let json = request.get()?;
        let page = page_titled(&json, &resolve_title(&json, &query_title))?;
        let infos = page
            .get("imageinfo")
            .and_then(Json::as_array)
            .map_or(&[][..], Vec::as_slice);
        let info = Lookup::exactly_one(infos)
            .found(format!("image info for {query_title:?}"), || format!("page = {page}"))?;
        let url = info.field("url").string()?;
        debug!(file_name, url, "resolved image");
        Ok(url.to_owned())
    }
}

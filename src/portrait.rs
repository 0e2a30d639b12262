use crate::{imageinfo::ImageInfo, infobox, Error, Mediawiki};
use reqwest::header::ACCEPT_ENCODING;
use std::io::Write;
use tracing::debug;

pub trait Portrait {
    /// Streams the body at `url` into `dest` as is, returning the number of
    /// bytes written. Anything written before a failure stays in `dest`.
    fn download_url<W: Write + ?Sized>(&self, url: &str, dest: &mut W) -> Result<u64, Error>;
    /// Looks up the infobox portrait of the article `title` and downloads it.
    fn download_portrait<W: Write + ?Sized>(&self, title: &str, dest: &mut W)
        -> Result<u64, Error>;
}
impl Portrait for Mediawiki {
    fn download_url<W: Write + ?Sized>(&self, url: &str, dest: &mut W) -> Result<u64, Error> {
        let mut response = self
            .client
            .get(url)
            .header(ACCEPT_ENCODING, "identity")
            .send()?
            .error_for_status()?;
        let bytes = response.copy_to(dest)?;
        debug!(url, bytes, "downloaded");
        Ok(bytes)
    }
    fn download_portrait<W: Write + ?Sized>(
        &self,
        title: &str,
        dest: &mut W,
    ) -> Result<u64, Error> {
        let text = self.query_article(title)?;
        let image = infobox::officeholder_image(&text)?;
        debug!(title, image = %image, "found portrait");
        let url = self.query_image_url(&image)?;
        self.download_url(&url, dest)
    }
}

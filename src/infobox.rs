use crate::{wikitext, Error, Lookup};

/// Infobox templates used on the biographies of members of Congress.
pub const OFFICEHOLDER_INFOBOXES: [&str; 5] = [
    "infobox officeholder",
    "infobox senator",
    "infobox congressman",
    "infobox politician",
    "infobox politician (general)",
];

/// File name of the portrait in the article's office holder infobox, without
/// the `File:` prefix.
///
/// The article must contain exactly one such infobox and it must carry a
/// non-empty `image` parameter.
pub fn officeholder_image(text: &str) -> Result<String, Error> {
    let templates = wikitext::templates(text);
    let infobox = Lookup::exactly_one(
        templates
            .iter()
            .filter(|template| OFFICEHOLDER_INFOBOXES.contains(&&*template.normalized_name())),
    )
    .found("office holder infobox", || {
        let names: Vec<_> = templates.iter().map(|template| &template.name).collect();
        format!("templates = {names:?}")
    })?;
    match infobox.get("image").map(str::trim) {
        Some(image) if !image.is_empty() => Ok(image.to_owned()),
        _ => Err(Error::NotFound {
            what: "image in the office holder infobox".into(),
            context: format!("{infobox:?}"),
        }),
    }
}

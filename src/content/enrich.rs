use std::fmt::Write;

use crate::feed::Item;

/// Builds the enriched description for `item`.
///
/// The original description is kept verbatim, followed by a blank line and
/// one `<img>` tag per image. The title goes into `alt` unescaped; the
/// serializer escapes the whole description as text.
pub fn enrich(item: &Item, images: &[String]) -> String {
    let mut description = String::with_capacity(
        item.description.len() + 2 + images.len() * (item.title.len() + 64),
    );
    description.push_str(&item.description);
    description.push_str("\n\n");

    for image in images {
        // Writing to a String cannot fail.
        let _ = writeln!(description, "<img src=\"{}\" alt=\"{}\">", image, item.title);
    }

    description
}

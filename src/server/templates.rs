use askama::Template;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    pub title: &'a str,
    pub extensions: &'a [&'a str],
    pub version: &'a str,
}

/// First keyword contained in `title`, ignoring case.
///
/// `keywords` must already be lowercase.
pub fn matching_keyword<'k>(title: &str, keywords: &'k [String]) -> Option<&'k str> {
    let title = title.to_lowercase();
    keywords
        .iter()
        .find(|keyword| title.contains(keyword.as_str()))
        .map(String::as_str)
}

// query strings behave like form handlers: the first `page` wins, and a page that is not a
// number is no page at all
pub fn first_lenient_page(pairs: &[(String, String)]) -> Option<i64> {
    pairs
        .iter()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.trim().parse::<i64>().ok())
}

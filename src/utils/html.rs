/// Strips dangerous markup from author-supplied text (titles, question
/// text, options) with ammonia's whitelist cleaner.
///
/// Safe inline tags survive; `<script>` is removed together with its
/// content. LaTeX source passes through, except `<`, `>` and `&` which
/// come back as HTML entities.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

use super::translit::transliterated_variant;
use super::{MatchKind, SearchResultItem, Target};

/// Match tokens for a query: the lowercase text, plus its transliteration
/// when that differs. Empty input yields no tokens.
pub fn query_tokens(text: &str) -> Vec<String> {
    let lower = text.trim().to_lowercase();
    if lower.is_empty() {
        return vec![];
    }

    let mut tokens = Vec::with_capacity(2);
    if let Some(translit) = transliterated_variant(&lower) {
        tokens.push(lower);
        tokens.push(translit);
    } else {
        tokens.push(lower);
    }
    tokens
}

/// Classify how `target` matches any of `tokens`, if at all.
///
/// Names match on a prefix or on a word start (`" " + token`), checked for
/// both the display name and its transliteration. Usernames match on a
/// case-insensitive prefix; a leading `@` in the token is ignored there.
/// The first token that matches decides the kind.
pub fn match_kind(target: &Target, tokens: &[String]) -> Option<MatchKind> {
    let name = target.display_name.to_lowercase();
    let translit = target.transliterated_name.as_deref().map(str::to_lowercase);
    let username = target.username.as_deref().map(str::to_lowercase);

    for token in tokens {
        if token.is_empty() {
            continue;
        }
        if name_matches(&name, token) || translit.as_deref().is_some_and(|t| name_matches(t, token)) {
            return Some(MatchKind::NameMatch);
        }
        if let Some(username) = username.as_deref() {
            let bare = token.strip_prefix('@').unwrap_or(token);
            if !bare.is_empty() && username.starts_with(bare) {
                return Some(MatchKind::UsernameMatch);
            }
        }
    }
    None
}

fn name_matches(name: &str, token: &str) -> bool {
    if name.starts_with(token) {
        return true;
    }
    let mut word_start = String::with_capacity(token.len() + 1);
    word_start.push(' ');
    word_start.push_str(token);
    name.contains(&word_start)
}

/// Keep the candidates that match, most recent interaction first.
/// Equal timestamps keep scan order.
pub fn rank_local(candidates: Vec<Target>, tokens: &[String]) -> Vec<SearchResultItem> {
    let mut items: Vec<SearchResultItem> = candidates
        .into_iter()
        .filter_map(|target| {
            let kind = match_kind(&target, tokens)?;
            Some(SearchResultItem::new(target, kind))
        })
        .collect();

    items.sort_by(|a, b| b.source_timestamp.cmp(&a.source_timestamp));
    items
}

//! Page classifier (§4.5 #3): URL patterns, title patterns, and content
//! signals each contribute weighted votes toward a page type.

use crate::model::{BaseSnapshot, NodeKind};

/// The closed set of page types the classifier can vote for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    Login,
    Signup,
    Cart,
    Checkout,
    Product,
    Article,
    SearchResults,
    Unknown,
}

/// The classifier's result: the winning type and its normalized score.
#[derive(Debug, Clone, Copy)]
pub struct PageClassification {
    pub page_type: PageType,
    pub score: f64,
}

/// A page type must clear this normalized score to win; below it, the
/// classifier reports `Unknown` rather than a low-confidence guess.
const MIN_WINNING_SCORE: f64 = 0.3;

struct Vote {
    page_type: PageType,
    weight: f64,
}

fn url_votes(url: &str) -> Vec<Vote> {
    let lower = url.to_lowercase();
    let mut votes = Vec::new();
    let patterns: &[(&str, PageType, f64)] = &[
        ("/login", PageType::Login, 0.6),
        ("/signin", PageType::Login, 0.6),
        ("/signup", PageType::Signup, 0.6),
        ("/register", PageType::Signup, 0.5),
        ("/cart", PageType::Cart, 0.6),
        ("/basket", PageType::Cart, 0.6),
        ("/checkout", PageType::Checkout, 0.7),
        ("/product", PageType::Product, 0.4),
        ("/p/", PageType::Product, 0.4),
        ("/article", PageType::Article, 0.4),
        ("/blog", PageType::Article, 0.3),
        ("/search", PageType::SearchResults, 0.5),
        ("?q=", PageType::SearchResults, 0.4),
    ];
    for (pattern, page_type, weight) in patterns {
        if lower.contains(pattern) {
            votes.push(Vote { page_type: *page_type, weight: *weight });
        }
    }
    votes
}

fn title_votes(title: &str) -> Vec<Vote> {
    let lower = title.to_lowercase();
    let mut votes = Vec::new();
    let patterns: &[(&str, PageType, f64)] = &[
        ("log in", PageType::Login, 0.4),
        ("sign in", PageType::Login, 0.4),
        ("sign up", PageType::Signup, 0.4),
        ("create account", PageType::Signup, 0.4),
        ("your cart", PageType::Cart, 0.4),
        ("shopping cart", PageType::Cart, 0.4),
        ("checkout", PageType::Checkout, 0.5),
        ("search results", PageType::SearchResults, 0.5),
    ];
    for (pattern, page_type, weight) in patterns {
        if lower.contains(pattern) {
            votes.push(Vote { page_type: *page_type, weight: *weight });
        }
    }
    votes
}

fn content_votes(snapshot: &BaseSnapshot) -> Vec<Vote> {
    let mut votes = Vec::new();
    let has_password_field = snapshot
        .nodes
        .iter()
        .any(|n| n.attributes.input_type.as_deref() == Some("password"));
    let has_email_field = snapshot
        .nodes
        .iter()
        .any(|n| n.attributes.input_type.as_deref() == Some("email"));
    let checkout_cta = snapshot.nodes.iter().any(|n| {
        n.kind == NodeKind::Button && {
            let label = n.label.to_lowercase();
            label.contains("place order") || label.contains("pay now")
        }
    });
    let add_to_cart = snapshot
        .nodes
        .iter()
        .any(|n| n.kind == NodeKind::Button && n.label.to_lowercase().contains("add to cart"));

    if has_password_field && has_email_field {
        votes.push(Vote { page_type: PageType::Login, weight: 0.3 });
    }
    if checkout_cta {
        votes.push(Vote { page_type: PageType::Checkout, weight: 0.4 });
    }
    if add_to_cart {
        votes.push(Vote { page_type: PageType::Product, weight: 0.4 });
    }
    votes
}

/// Classify a page's type from URL, title, and content signals (§4.5 #3).
#[must_use]
pub fn classify_page(snapshot: &BaseSnapshot) -> PageClassification {
    let mut votes = url_votes(&snapshot.url);
    votes.extend(title_votes(&snapshot.title));
    votes.extend(content_votes(snapshot));

    let mut totals: std::collections::HashMap<u8, f64> = std::collections::HashMap::new();
    for vote in &votes {
        *totals.entry(page_type_tag(vote.page_type)).or_insert(0.0) += vote.weight;
    }

    let Some((&winning_tag, &score)) = totals.iter().max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal)) else {
        return PageClassification { page_type: PageType::Unknown, score: 0.0 };
    };

    let normalized = (score / 1.5).min(1.0);
    if normalized < MIN_WINNING_SCORE {
        return PageClassification { page_type: PageType::Unknown, score: normalized };
    }

    PageClassification { page_type: page_type_from_tag(winning_tag), score: normalized }
}

fn page_type_tag(page_type: PageType) -> u8 {
    match page_type {
        PageType::Login => 0,
        PageType::Signup => 1,
        PageType::Cart => 2,
        PageType::Checkout => 3,
        PageType::Product => 4,
        PageType::Article => 5,
        PageType::SearchResults => 6,
        PageType::Unknown => 7,
    }
}

fn page_type_from_tag(tag: u8) -> PageType {
    match tag {
        0 => PageType::Login,
        1 => PageType::Signup,
        2 => PageType::Cart,
        3 => PageType::Checkout,
        4 => PageType::Product,
        5 => PageType::Article,
        6 => PageType::SearchResults,
        _ => PageType::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SnapshotMeta;

    fn snapshot(url: &str, title: &str) -> BaseSnapshot {
        BaseSnapshot {
            snapshot_id: "s".into(),
            document_id: "d".into(),
            url: url.into(),
            title: title.into(),
            captured_at_ms: 0,
            viewport: crate::model::Viewport { w: 1280, h: 800, dpr: 1.0 },
            meta: SnapshotMeta::default(),
            nodes: vec![],
            degraded: false,
        }
    }

    #[test]
    fn checkout_url_and_title_win_decisively() {
        let snap = snapshot("https://shop.example.com/checkout", "Checkout - Review your order");
        let result = classify_page(&snap);
        assert_eq!(result.page_type, PageType::Checkout);
        assert!(result.score >= MIN_WINNING_SCORE);
    }

    #[test]
    fn unrelated_page_is_unknown() {
        let snap = snapshot("https://example.com/", "Welcome");
        let result = classify_page(&snap);
        assert_eq!(result.page_type, PageType::Unknown);
    }

    #[test]
    fn login_url_wins() {
        let snap = snapshot("https://example.com/login", "Sign in");
        let result = classify_page(&snap);
        assert_eq!(result.page_type, PageType::Login);
    }
}

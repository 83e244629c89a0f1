//! Fixtures shared by the integration tests

use pubindex::record::{AuthorRef, PublicationRecord};

#[allow(dead_code)]
pub fn author(name: &str, slug: &str) -> AuthorRef {
    AuthorRef {
        name: name.to_string(),
        profile_link: format!("https://pureportal.coventry.ac.uk/en/persons/{slug}"),
    }
}

#[allow(dead_code)]
pub fn record(title: &str, slug: &str, authors: Vec<AuthorRef>, date: &str) -> PublicationRecord {
    PublicationRecord {
        title: title.to_string(),
        link: format!("https://pureportal.coventry.ac.uk/en/publications/{slug}"),
        authors,
        date: date.to_string(),
    }
}

/// `count` distinct records, numbered from zero.
#[allow(dead_code)]
pub fn numbered_records(count: usize) -> Vec<PublicationRecord> {
    (0..count)
        .map(|i| {
            record(
                &format!("Working paper number {i}"),
                &format!("wp-{i}"),
                vec![author(&format!("Author {i}"), &format!("author-{i}"))],
                &format!("{} Jan 2024", i % 28 + 1),
            )
        })
        .collect()
}

/// A rendered listing page in the portal's markup, with relative hrefs.
#[allow(dead_code)]
pub fn listing_page(items: &[(&str, &str, &[(&str, &str)], Option<&str>)]) -> String {
    let mut html = String::from(
        r#"<!DOCTYPE html><html><head><title>Publications</title></head><body>
<div class="list-results"><ul class="list-results">"#,
    );
    for (title, href, authors, date) in items {
        html.push_str(r#"<li class="list-result-item"><div class="result-container">"#);
        html.push_str(&format!(
            r#"<h3 class="title"><a rel="ContributionToJournal" href="{href}"><span>{title}</span></a></h3>"#
        ));
        for (name, profile) in authors.iter() {
            html.push_str(&format!(
                r#"<a rel="Person" href="{profile}" class="link person"><span>{name}</span></a>, "#
            ));
        }
        if let Some(date) = date {
            html.push_str(&format!(r#"<span class="date">{date}</span>"#));
        }
        html.push_str("</div></li>");
    }
    html.push_str("</ul></div></body></html>");
    html
}

/// The page as served before any results have rendered.
#[allow(dead_code)]
pub fn loading_page() -> String {
    r#"<!DOCTYPE html><html><head><title>Publications</title></head>
<body><div id="main"><p>Loading…</p></div></body></html>"#
        .to_string()
}

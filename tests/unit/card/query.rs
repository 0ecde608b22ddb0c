use super::*;

#[test]
fn empty_query_yields_the_sample_card() {
    assert_eq!(parse_query(""), CardModel::sample());
    assert_eq!(parse_query("?"), CardModel::sample());
}

#[test]
fn end_to_end_query_decodes_every_field() {
    let m = parse_query("company=Acme&batch=Summer%202027&jobs=12&url=https://acme.io&tags=AI,SAAS");
    assert_eq!(m.company(), "Acme");
    assert_eq!(m.batch(), Batch::Summer2027);
    assert_eq!(m.jobs(), 12);
    assert_eq!(m.url(), "https://acme.io");
    assert_eq!(m.tags().iter().collect::<Vec<_>>(), vec!["AI", "SAAS"]);
    assert!(m.logo().is_none());
    assert!(m.description().is_none());
}

#[test]
fn plus_encoded_spaces_decode() {
    let m = parse_query("company=Acme+Labs&batch=Summer+2027");
    assert_eq!(m.company(), "Acme Labs");
    assert_eq!(m.batch(), Batch::Summer2027);
}

#[test]
fn malformed_jobs_coerce_to_default() {
    assert_eq!(parse_query("jobs=-5").jobs(), 69);
    assert_eq!(parse_query("jobs=abc").jobs(), 69);
    assert_eq!(parse_query("jobs=").jobs(), 69);
    assert_eq!(parse_query("jobs=0").jobs(), 0);
}

#[test]
fn empty_scalars_fall_back_and_unknown_batch_defaults() {
    let m = parse_query("company=&url=&batch=Autumn%201999");
    assert_eq!(m.company(), "Company Name");
    assert_eq!(m.url(), "https://yourcompany.com");
    assert_eq!(m.batch(), Batch::Winter2030);
}

#[test]
fn tags_absent_default_but_empty_means_none() {
    assert_eq!(parse_query("company=X").tags().len(), 3);
    assert!(parse_query("company=X&tags=").tags().is_empty());
    assert_eq!(
        parse_query("tags=AI,AI,%20ML%20,").tags().to_delimited(),
        "AI,ML"
    );
}

#[test]
fn first_occurrence_wins() {
    assert_eq!(parse_query("company=One&company=Two").company(), "One");
}

#[test]
fn logo_schemes_are_filtered() {
    let m = parse_query("logo=https://acme.io/logo.png");
    assert_eq!(
        m.logo(),
        Some(&LogoRef::Url("https://acme.io/logo.png".to_string()))
    );
    assert!(parse_query("logo=file:///etc/passwd").logo().is_none());
    assert!(parse_query("logo=not%20a%20url").logo().is_none());
}

#[test]
fn encoded_query_round_trips() {
    let m = CardModel::new("Acme Labs & Co", "https://acme.io/?a=1", Batch::Winter2027)
        .with_jobs(3)
        .with_description("We build rockets")
        .with_tags(["AI", "B2B"].into_iter().collect())
        .with_logo(LogoRef::Url("https://acme.io/logo.png".to_string()));

    let qs = to_query_string(&m);
    assert!(qs.starts_with("company=Acme+Labs+%26+Co&logo="));
    assert_eq!(parse_query(&qs), m);
}

#[test]
fn byte_logos_are_not_encoded() {
    let m = CardModel::sample().with_logo(LogoRef::Bytes(std::sync::Arc::new(vec![1, 2, 3])));
    assert!(!to_query_string(&m).contains("logo="));
}

#[test]
fn share_url_attaches_query() {
    let link = share_url("https://cards.example/api/og", &CardModel::sample()).unwrap();
    assert!(link.starts_with("https://cards.example/api/og?company=Company+Name&batch=Winter+2030"));
    assert!(share_url("not a url", &CardModel::sample()).is_err());
}

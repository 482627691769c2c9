use campus_scraper::sources::cordy::CordySource;
use campus_scraper::sources::sg_innovate::SgInnovateSource;
use campus_scraper::types::EventMode;

const CORDY_LISTING: &str = r#"<html><body>
<div class="opp-cms-wrapper w-dyn-item">
  <a class="opp-cms-link-item" href="/opportunities/ai-bootcamp"></a>
  <div class="text-block-6">AI Bootcamp</div>
  <div class="text-block-10">July 05, 2025</div>
  <div class="text-block-18">AI</div>
  <div class="text-block-18">Tech</div>
  <div class="text-block-18">AI</div>
  <div class="opp-cms-organisation">Cordy Labs</div>
  <div class="opp-cms-caption">Learn AI fast.</div>
  <div class="opp-cms-thumbnail"><img src="https://cdn.cordy.sg/thumbs/ai.png"></div>
</div>
<div class="opp-cms-wrapper w-dyn-item">
  <a class="opp-cms-link-item" href="/opportunities/ghost"></a>
  <div class="text-block-10">July 06, 2025</div>
</div>
</body></html>"#;

#[test]
fn cordy_listing_extracts_cards_and_drops_titleless_ones() {
    let listed = CordySource::parse_listing(CORDY_LISTING);
    assert_eq!(listed.len(), 1);

    let entry = &listed[0];
    assert_eq!(entry.event.title, "AI Bootcamp");
    assert_eq!(entry.event.link, "https://www.cordy.sg/opportunities/ai-bootcamp");
    assert_eq!(entry.raw_deadline, "July 05, 2025");
    assert_eq!(entry.event.tags, ["AI", "Tech"]);
    assert_eq!(entry.event.organisation.as_deref(), Some("Cordy Labs"));
    assert_eq!(entry.event.brief_description, "Learn AI fast.");
    assert_eq!(entry.event.image.as_deref(), Some("https://cdn.cordy.sg/thumbs/ai.png"));
    assert_eq!(entry.event.mode, EventMode::Unknown);
    assert_eq!(entry.event.origin, "web");
}

const CORDY_DETAIL: &str = r#"<html><body>
<div>nav</div>
<div>banner</div>
<div>
  <div>
    <a href="https://forms.example.com/ai-bootcamp">Register</a>
    <div>breadcrumbs</div>
    <div>hero</div>
    <div>
      <div>meta</div>
      <div>share</div>
      <div>
        <p>Join us for an <strong>intensive</strong> bootcamp.</p>
        <p>Bring a laptop.</p>
      </div>
    </div>
  </div>
</div>
</body></html>"#;

#[test]
fn cordy_detail_extracts_description_and_signup_link() {
    let detail = CordySource::extract_detail(CORDY_DETAIL).unwrap();
    assert_eq!(detail.signup_link, "https://forms.example.com/ai-bootcamp");
    assert_eq!(
        detail.description,
        "Join us for an intensive bootcamp.\nBring a laptop."
    );
}

#[test]
fn cordy_detail_rejects_unrecognized_pages() {
    assert!(CordySource::extract_detail("<html><body><p>404</p></body></html>").is_none());
}

const SG_INNOVATE_LISTING: &str = r#"<html><body>
<div class="col-md-6 col-lg-4 mb-4">
  <img src="https://cdn.sginnovate.com/cards/quantum.png">
  <h4><a href="/events/quantum-talk">Quantum Computing Talk</a></h4>
  <p>Jul 05, 2025</p>
  <div class="register-hld"><a href="https://register.example.com/quantum">Register</a></div>
  <a href="/search-events?topic=Quantum">Quantum</a>
  <a href="/search-events?topic=DeepTech">Deep Tech</a>
  <a href="/search-events?all=1">+3</a>
</div>
<div class="col-md-6 col-lg-4 mb-4">
  <img src="/images/Host-an-event-banner.png">
  <h4><a href="/host-an-event">Host your own event</a></h4>
</div>
<div class="col-md-6 col-lg-4 mb-4">
  <h4><a href="/events/untitled"></a></h4>
  <p>Jul 09, 2025</p>
</div>
</body></html>"#;

#[test]
fn sg_innovate_listing_skips_promos_and_titleless_cards() {
    let listed = SgInnovateSource::parse_listing(SG_INNOVATE_LISTING);
    assert_eq!(listed.len(), 1);

    let entry = &listed[0];
    assert_eq!(entry.event.title, "Quantum Computing Talk");
    assert_eq!(entry.event.link, "https://www.sginnovate.com/events/quantum-talk");
    assert_eq!(entry.event.signup_link, "https://register.example.com/quantum");
    assert_eq!(entry.event.image.as_deref(), Some("https://cdn.sginnovate.com/cards/quantum.png"));
    assert_eq!(entry.raw_deadline, "Jul 05, 2025");
    // overflow "+N" markers are not tags
    assert_eq!(entry.event.tags, ["Quantum", "Deep Tech"]);
    assert_eq!(entry.event.organisation, None);
}

const SG_INNOVATE_DETAIL: &str = r#"<html><body>
<div id="content">
  <section>
    <div><div><div>
      <header>
        <div>crumbs</div>
        <div>title</div>
        <div>
          <div>
            <div>
              <div>
                <div>when</div>
                <div><p>One-North Auditorium</p></div>
              </div>
            </div>
          </div>
        </div>
      </header>
      <div><div>
        <div>sidebar</div>
        <div>
          <article>
            <div><p>A quick look at quantum.</p></div>
            <div>meta</div>
            <div>
              <section><p>Full description of the talk.</p></section>
              <section><p>6:30pm Registration</p><p>7:00pm Talk</p></section>
            </div>
          </article>
        </div>
      </div></div>
    </div></div></div>
  </section>
</div>
</body></html>"#;

#[test]
fn sg_innovate_detail_extracts_all_fixed_position_fields() {
    let detail = SgInnovateSource::extract_detail(SG_INNOVATE_DETAIL).unwrap();
    assert_eq!(detail.brief_description, "A quick look at quantum.");
    assert_eq!(detail.description, "Full description of the talk.");
    assert_eq!(detail.schedule, "6:30pm Registration\n7:00pm Talk");
    assert_eq!(detail.location, "One-North Auditorium");
}

#[test]
fn sg_innovate_detail_rejects_unrecognized_pages() {
    assert!(SgInnovateSource::extract_detail("<html><body><p>404</p></body></html>").is_none());
}

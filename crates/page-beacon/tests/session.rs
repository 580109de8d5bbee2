use page_beacon::dom::{ATTR_EVENT, ATTR_SECTION};
use page_beacon::{BeaconConfig, Element, EventName, PageHandle, PageSession, SimulatedPage, TransportKind};
use pretty_assertions::assert_eq;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Instant};
use tokio_util::sync::CancellationToken;

const HOME: &str = "https://fabio.dev/";

fn button(id: &str) -> Vec<Element> {
	vec![Element::new("span").with_text("→"), Element::new("button").with_id(id).with_text("Send message")]
}

fn start(page: SimulatedPage) -> (PageHandle, CancellationToken, JoinHandle<page_beacon::ClientStats>) {
	let handle = page.handle();
	let shutdown = CancellationToken::new();
	let session = PageSession::start(page, BeaconConfig::default()).unwrap();
	(handle, shutdown.clone(), session.spawn(shutdown))
}

async fn wait_for(handle: &PageHandle, count: usize) {
	timeout(Duration::from_secs(1), handle.wait_for_deliveries(count)).await.expect("beacon never arrived");
}

#[tokio::test(start_paused = true)]
async fn test_timer_flushes_pending_events_once() {
	let (handle, shutdown, session) = start(SimulatedPage::new(HOME).unwrap());

	// page_view plus two clicks
	assert_eq!(handle.click(button("a")), 1);
	assert_eq!(handle.click(button("b")), 1);

	sleep(Duration::from_millis(4_999)).await;
	assert!(handle.deliveries().is_empty());

	sleep(Duration::from_millis(1)).await;
	wait_for(&handle, 1).await;

	let deliveries = handle.deliveries();
	assert_eq!(deliveries.len(), 1);
	let names: Vec<EventName> = deliveries[0].events().unwrap().into_iter().map(|e| e.event_name).collect();
	assert_eq!(names, vec![EventName::PageView, EventName::Click, EventName::Click]);

	// A later tick finds nothing to send.
	sleep(Duration::from_millis(5_000)).await;
	assert_eq!(handle.deliveries().len(), 1);

	shutdown.cancel();
	let stats = session.await.unwrap();
	assert_eq!(stats.sent, 3);
	assert_eq!(stats.batches, 1);
}

#[tokio::test(start_paused = true)]
async fn test_hidden_page_flushes_immediately() {
	let (handle, shutdown, session) = start(SimulatedPage::new(HOME).unwrap());
	let started = Instant::now();

	sleep(Duration::from_millis(1_200)).await;
	assert_eq!(handle.hide(), 1);
	wait_for(&handle, 1).await;

	assert!(started.elapsed() < Duration::from_secs(5));
	let events = handle.delivered_events();
	assert_eq!(events.len(), 1);
	assert_eq!(events[0].event_name, EventName::PageView);

	shutdown.cancel();
	session.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_burst_of_clicks_flushes_at_threshold_then_on_unload() {
	let (handle, shutdown, session) = start(SimulatedPage::new(HOME).unwrap());

	for i in 0..25 {
		handle.click(button(&format!("btn-{i}")));
	}
	wait_for(&handle, 1).await;
	assert_eq!(handle.deliveries()[0].events().unwrap().len(), 20);

	handle.unload();
	wait_for(&handle, 2).await;

	let events = handle.delivered_events();
	assert_eq!(handle.deliveries().len(), 2);
	assert_eq!(events.len(), 26);
	assert_eq!(events[0].event_name, EventName::PageView);

	let clicks: Vec<&str> = events[1..].iter().map(|e| e.element_id.as_str()).collect();
	let expected: Vec<String> = (0..25).map(|i| format!("btn-{i}")).collect();
	assert_eq!(clicks, expected.iter().map(String::as_str).collect::<Vec<_>>());

	shutdown.cancel();
	session.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_opted_out_page_sends_nothing() {
	let page = SimulatedPage::new(HOME).unwrap().with_meta("analytics-enabled", "false");
	let (handle, _shutdown, session) = start(page);

	assert_eq!(handle.click(button("a")), 0);
	assert_eq!(handle.hide(), 0);
	assert_eq!(handle.unload(), 0);

	let stats = session.await.unwrap();
	assert_eq!(stats.enqueued, 0);
	assert!(handle.deliveries().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_other_meta_values_keep_tracking_on() {
	let page = SimulatedPage::new(HOME).unwrap().with_meta("analytics-enabled", "False");
	let (handle, shutdown, session) = start(page);

	handle.hide();
	wait_for(&handle, 1).await;

	shutdown.cancel();
	assert_eq!(session.await.unwrap().sent, 1);
}

#[tokio::test(start_paused = true)]
async fn test_sections_report_on_entering_view() {
	let page = SimulatedPage::new("https://fabio.dev/about")
		.unwrap()
		.with_section(Element::new("section").with_attr(ATTR_SECTION, "experience"))
		.with_section(Element::new("section").with_id("education").with_class("snap-section"))
		.with_section(Element::new("section").with_id("plain"));
	let (handle, shutdown, session) = start(page);

	assert_eq!(handle.scroll_to("experience", 0.3), 0);
	assert_eq!(handle.scroll_to("experience", 0.75), 1);
	assert_eq!(handle.scroll_to("experience", 0.9), 0);
	assert_eq!(handle.scroll_to("experience", 0.1), 1);
	assert_eq!(handle.scroll_to("experience", 0.6), 1);
	assert_eq!(handle.scroll_to("education", 1.0), 1);
	assert_eq!(handle.scroll_to("plain", 1.0), 0);

	handle.add_section(Element::new("section").with_attr(ATTR_SECTION, "late"));
	assert_eq!(handle.scroll_to("late", 1.0), 0);

	handle.hide();
	wait_for(&handle, 1).await;

	let sections: Vec<(EventName, String)> = handle.delivered_events().into_iter().skip(1).map(|e| (e.event_name, e.element_id)).collect();
	assert_eq!(
		sections,
		vec![
			(EventName::SectionScroll, "experience".to_string()),
			(EventName::SectionScroll, "experience".to_string()),
			(EventName::SectionScroll, "education".to_string()),
		]
	);

	shutdown.cancel();
	session.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_custom_and_outbound_clicks() {
	let page = SimulatedPage::new("https://fabio.dev/projects").unwrap().with_referrer("https://news.ycombinator.com/");
	let (handle, shutdown, session) = start(page);

	handle.click(vec![Element::new("a").with_attr("href", "https://github.com/oornnery").with_text("GitHub")]);
	handle.click(vec![Element::new("a").with_attr("href", "https://github.com/oornnery").with_attr(ATTR_EVENT, "repo_visit")]);
	handle.click(vec![Element::new("p").with_text("not trackable")]);
	handle.hide();
	wait_for(&handle, 1).await;

	let events = handle.delivered_events();
	assert_eq!(events.len(), 3);
	assert_eq!(events[0].metadata["referrer"], "https://news.ycombinator.com/");
	assert_eq!(events[1].event_name, EventName::OutboundClick);
	assert_eq!(events[1].page_path, "/projects");
	assert_eq!(events[2].event_name, EventName::Custom("repo_visit".into()));

	let delivery = &handle.deliveries()[0];
	assert_eq!(delivery.url, "https://fabio.dev/api/v1/analytics/track");
	assert_eq!(delivery.content_type, "application/json");

	shutdown.cancel();
	session.await.unwrap();
}

#[tokio::test]
async fn test_beacon_preferred_when_available() {
	let with_beacon = PageSession::start(SimulatedPage::new(HOME).unwrap(), BeaconConfig::default()).unwrap();
	let without_beacon = PageSession::start(SimulatedPage::new(HOME).unwrap().without_beacon(), BeaconConfig::default()).unwrap();

	assert_eq!(with_beacon.client().transport_kind(), TransportKind::Beacon);
	assert_eq!(without_beacon.client().transport_kind(), TransportKind::KeepAlive);
	assert_eq!(with_beacon.client().pending(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_discards_undelivered_events() {
	let (handle, shutdown, session) = start(SimulatedPage::new(HOME).unwrap());
	handle.click(button("late"));
	sleep(Duration::from_millis(10)).await;

	shutdown.cancel();
	let stats = session.await.unwrap();

	assert_eq!(stats.enqueued, 2);
	assert_eq!(stats.discarded, 2);
	assert!(handle.deliveries().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_timer_outlives_dropped_listeners() {
	let (handle, shutdown, session) = start(SimulatedPage::new(HOME).unwrap());

	handle.detach_listeners();
	assert_eq!(handle.click(button("gone")), 0);

	sleep(Duration::from_millis(5_000)).await;
	wait_for(&handle, 1).await;

	let events = handle.delivered_events();
	assert_eq!(events.len(), 1);
	assert_eq!(events[0].event_name, EventName::PageView);
	assert!(!session.is_finished());

	shutdown.cancel();
	let stats = session.await.unwrap();
	assert_eq!(stats.sent, 1);
	assert_eq!(stats.discarded, 0);
}

use crate::client::{ClientStats, FlushTrigger, TelemetryClient};
use crate::config::BeaconConfig;
use crate::dom::Element;
use crate::environment::{Environment, PageSignal, SignalReceiver};
use crate::error::Result;
use crate::transport::select_transport;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Telemetry wiring for one page load.
///
/// `start` reads the opt-out flag, records the page view and registers every
/// listener; `run` is the single task that owns the queue from then on.
pub struct PageSession<E: Environment> {
	env: E,
	client: TelemetryClient,
	signals: SignalReceiver,
}

impl<E: Environment> PageSession<E> {
	/// Must be called from inside a tokio runtime.
	pub fn start(mut env: E, config: BeaconConfig) -> Result<Self> {
		let location = env.location();
		let enabled = env.analytics_enabled();
		let url = location.resolve(&config.endpoint)?;
		let transport = select_transport(&env, url)?;
		let threshold = config.visibility_threshold;

		let mut client = TelemetryClient::new(config, location, transport, enabled);
		let (tx, signals) = mpsc::unbounded_channel();

		if enabled {
			client.track_page_view(&env.referrer());

			env.on_click(tx.clone());
			env.on_visibility_hidden(tx.clone());
			env.on_unload(tx.clone());

			let sections: Vec<Element> = env.trackable_sections().into_iter().filter(Element::is_tracked_section).collect();
			if !sections.is_empty() {
				env.observe_intersection(sections, threshold, tx);
			}
			tracing::debug!(path = client.location().pathname(), "page telemetry started");
		} else {
			tracing::debug!("page telemetry disabled by meta tag");
		}

		Ok(Self { env, client, signals })
	}

	#[must_use]
	pub const fn client(&self) -> &TelemetryClient {
		&self.client
	}

	#[must_use]
	pub const fn environment(&self) -> &E {
		&self.env
	}

	pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<ClientStats> {
		tokio::spawn(self.run(shutdown))
	}

	/// Serve triggers until `shutdown` fires. The flush timer keeps running
	/// after the host drops every listener.
	pub async fn run(mut self, shutdown: CancellationToken) -> ClientStats {
		if !self.client.is_enabled() {
			return self.client.stats();
		}

		let period = self.client.config().flush_interval;
		let mut ticker = interval_at(Instant::now() + period, period);
		ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

		let mut listening = true;
		loop {
			tokio::select! {
				biased;
				() = shutdown.cancelled() => {
					tracing::debug!("page torn down");
					break;
				}
				signal = self.signals.recv(), if listening => match signal {
					Some(signal) => self.handle(signal),
					None => {
						tracing::debug!("page listeners dropped, timer keeps flushing");
						listening = false;
					}
				},
				_ = ticker.tick() => {
					self.client.flush(FlushTrigger::Timer);
				}
			}
		}

		self.client.dispose();
		self.client.stats()
	}

	fn handle(&mut self, signal: PageSignal) {
		match signal {
			PageSignal::Click(path) => {
				self.client.track_click(&path);
			}
			PageSignal::Intersection(entries) => {
				self.client.track_intersections(&entries);
			}
			PageSignal::VisibilityHidden => {
				self.client.flush(FlushTrigger::VisibilityHidden);
			}
			PageSignal::Unload => {
				self.client.flush(FlushTrigger::Unload);
			}
		}
	}
}

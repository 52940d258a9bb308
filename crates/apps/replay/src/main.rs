//! Headless replay of a map session.
//!
//! Feeds synthetic data into a [`MapEngine`] driven by a logical clock,
//! simulates pan/zoom gestures, an optional GPU context loss and a theme
//! switch, then prints the engine counters as JSON.

mod feeds;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use engine::{
    EngineConfig, EngineEvent, MapEngine, PickHit, PickResult, PickedObject, PlatformSignal,
    QueuedSignals,
};
use foundation::bounds::LonLat;
use foundation::time::Millis;
use gpu::{MapEvent, RecordingRenderer, StaticBaseMap};
use layers::{Theme, ids};
use runtime::{ManualClock, RenderMetrics};
use scene::{DeviceTier, LayerKey};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum TierArg {
    Full,
    Lite,
    Static,
}

impl From<TierArg> for DeviceTier {
    fn from(t: TierArg) -> Self {
        match t {
            TierArg::Full => DeviceTier::Full,
            TierArg::Lite => DeviceTier::Lite,
            TierArg::Static => DeviceTier::Static,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Replay a synthetic session through the layer engine")]
struct Args {
    /// Engine configuration (JSON). Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = TierArg::Full)]
    tier: TierArg,

    /// Animation frames to simulate.
    #[arg(long, default_value_t = 600)]
    frames: u32,

    #[arg(long, default_value_t = 16)]
    frame_ms: i64,

    #[arg(long, default_value_t = 200)]
    fires: usize,

    /// Frame at which the GPU context is lost.
    #[arg(long)]
    lose_context_at: Option<u32>,

    #[arg(long, default_value_t = 60)]
    context_lost_frames: u32,

    /// Frame at which the platform reports a light theme.
    #[arg(long)]
    theme_switch_at: Option<u32>,

    #[arg(long, default_value_t = false)]
    pretty: bool,
}

#[derive(Debug, Serialize)]
struct Summary {
    tier: DeviceTier,
    frames: u32,
    compositions_from_ticks: u64,
    renderer_submissions: usize,
    metrics: RenderMetrics,
    cache_hit_ratio: Option<f64>,
    layers: Vec<String>,
    events: BTreeMap<&'static str, u64>,
}

fn event_name(event: &EngineEvent) -> &'static str {
    match event {
        EngineEvent::Popup(_) => "popup",
        EngineEvent::CountryClicked(_) => "country_clicked",
        EngineEvent::DegradedMode { .. } => "degraded_mode",
        EngineEvent::LayersRendered { .. } => "layers_rendered",
        EngineEvent::LayerToggled { .. } => "layer_toggled",
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    config.validate().context("invalid engine config")?;

    let start = Millis(1_700_000_000_000);
    let clock = ManualClock::new(start);
    let renderer = RecordingRenderer::new();
    let signals = QueuedSignals::new();
    let tier: DeviceTier = args.tier.into();

    let mut engine = MapEngine::new(config, Box::new(clock.clone()), Box::new(renderer.clone()))
        .with_base_map(Box::new(StaticBaseMap::new(2.0)))
        .with_signals(Box::new(signals.clone()))
        .with_tier(tier);

    let counts: Rc<RefCell<BTreeMap<&'static str, u64>>> = Rc::default();
    let sink = counts.clone();
    engine.on(move |event| {
        *sink.borrow_mut().entry(event_name(event)).or_default() += 1;
    });

    engine.set_country_geometry(feeds::countries());
    engine.set_conflict_zones(feeds::conflict_zones(12));
    engine.set_pipelines(feeds::pipelines(20));
    engine.set_bases(feeds::bases(40));
    engine.set_hotspots(feeds::hotspots(30, 7));
    engine.set_fires(feeds::fires(args.fires, start, 6 * 60));
    let (flights, clusters) = feeds::flights(80, start);
    engine.set_military_flights(flights, clusters);
    engine.set_vessels(feeds::vessels(120, start));
    engine.set_news_locations(feeds::news(60, 5, start));
    for key in [LayerKey::Fires, LayerKey::Flights, LayerKey::Vessels, LayerKey::Bases] {
        engine.set_layer_enabled(key, true);
    }
    info!(tier = tier.as_str(), frames = args.frames, "replay started");

    let restore_at = args
        .lose_context_at
        .map(|f| f.saturating_add(args.context_lost_frames));
    let mut composed = 0u64;
    for frame in 0..args.frames {
        if Some(frame) == args.lose_context_at {
            engine.handle_map_event(MapEvent::ContextLost);
        }
        if Some(frame) == restore_at {
            engine.handle_map_event(MapEvent::ContextRestored);
        }
        if Some(frame) == args.theme_switch_at {
            signals.push(PlatformSignal::ThemeChanged(Theme::Light));
        }

        // A pan gesture every two seconds, lasting half a second.
        match frame % 120 {
            0 => engine.handle_map_event(MapEvent::MoveStart),
            1..=29 => engine.handle_map_event(MapEvent::Move),
            30 => engine.handle_map_event(MapEvent::MoveEnd),
            60 => engine.set_zoom(2.0 + f64::from(frame / 120 % 4)),
            _ => {}
        }

        if engine.tick() {
            composed += 1;
        }
        clock.advance(args.frame_ms);
    }

    // One click on a fire and one on bare map.
    let fire = PickResult {
        coordinate: LonLat::new(0.0, 0.0),
        x: 512.0,
        y: 256.0,
        hit: Some(PickHit {
            layer_id: ids::FIRES.to_string(),
            object: PickedObject::Record { id: "fire-0".into() },
        }),
    };
    engine.handle_pick(&fire);
    engine.handle_pick(&PickResult {
        coordinate: LonLat::new(10.0, 45.0),
        x: 540.0,
        y: 128.0,
        hit: None,
    });

    let metrics = engine.metrics();
    let summary = Summary {
        tier,
        frames: args.frames,
        compositions_from_ticks: composed,
        renderer_submissions: renderer.submissions(),
        cache_hit_ratio: metrics.cache_hit_ratio(),
        metrics,
        layers: engine.layers().iter().map(|l| l.id.clone()).collect(),
        events: counts.borrow().clone(),
    };
    engine.destroy();
    info!(elapsed_ms = clock.peek().since(start), "replay finished");

    let out = if args.pretty {
        serde_json::to_string_pretty(&summary)?
    } else {
        serde_json::to_string(&summary)?
    };
    println!("{out}");
    Ok(())
}

use std::io;
use std::path::PathBuf;

use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use present_wm::config::EffectConfig;
use present_wm::effect::{EffectState, OverviewEffect};
use present_wm::geometry::Rect;
use present_wm::host::{HostCommand, HostEvent, Key, Screen, WindowId, WindowInfo};
use present_wm::selection::ActivationMode;
use present_wm::tracing_sub;

const TICK_MS: u64 = 16;
const MAX_TICKS: u32 = 600;

const CAPTIONS: [&str; 8] = [
    "Files", "Editor", "Browser", "Terminal", "Mail", "Music", "Chat", "Viewer",
];

#[derive(Parser, Debug)]
#[command(
    name = "present-wm",
    version = env!("CARGO_PKG_VERSION"),
    about = "Drive the window overview effect against a simulated host"
)]
struct DemoCli {
    /// Number of windows to scatter on the simulated screen.
    #[arg(short = 'n', long = "windows", value_name = "COUNT", default_value_t = 6)]
    windows: u64,

    /// RNG seed for window placement, for repeatable runs.
    #[arg(short = 's', long = "seed", value_name = "SEED", default_value_t = 42)]
    seed: u64,

    /// Effect configuration as a JSON file; defaults apply otherwise.
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,
}

fn load_config(cli: &DemoCli) -> io::Result<EffectConfig> {
    match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            serde_json::from_str(&text).map_err(io::Error::other)
        }
        None => Ok(EffectConfig::default()),
    }
}

fn scatter_windows(effect: &mut OverviewEffect, count: u64, seed: u64, area: Rect) {
    let mut rng = StdRng::seed_from_u64(seed);
    for i in 0..count {
        let width = rng.random_range(300..900);
        let height = rng.random_range(200..600);
        let x = rng.random_range(area.x..(area.right() - width).max(area.x + 1));
        let y = rng.random_range(area.y..(area.bottom() - height).max(area.y + 1));
        let mut info = WindowInfo::client(WindowId(i), Rect::new(x, y, width, height));
        info.caption = format!("{} {i}", CAPTIONS[i as usize % CAPTIONS.len()]);
        info.window_class = CAPTIONS[i as usize % CAPTIONS.len()].to_lowercase();
        info.icon = format!("{}-icon", info.window_class);
        effect.handle_event(HostEvent::WindowAdded(info));
    }
}

fn pump(effect: &mut OverviewEffect, label: &str) {
    for _ in 0..MAX_TICKS {
        effect.advance(TICK_MS);
        for command in effect.drain_commands() {
            if command != HostCommand::RepaintFull {
                println!("  [{label}] host command: {command:?}");
            }
        }
        let settled = matches!(effect.state(), EffectState::Active | EffectState::Inactive);
        if settled {
            break;
        }
    }
}

fn main() -> io::Result<()> {
    tracing_sub::init_default();
    let cli = DemoCli::parse();
    if !(2..=64).contains(&cli.windows) {
        return Err(io::Error::other("window count must be between 2 and 64"));
    }
    let config = load_config(&cli)?;

    let area = Rect::new(0, 0, 1600, 900);
    let usable = Rect::new(0, 0, 1600, 868); // 32px panel strip at the bottom
    let mut effect = OverviewEffect::new(config, vec![Screen::with_panel(area, usable)], 4);
    scatter_windows(&mut effect, cli.windows, cli.seed, area);

    println!("activating overview with {} windows", cli.windows);
    effect.toggle(ActivationMode::CurrentDesktop);
    for command in effect.drain_commands() {
        println!("  [activate] host command: {command:?}");
    }
    pump(&mut effect, "activate");

    println!("\npresented layout:");
    for element in effect.render_elements() {
        let caption = element
            .caption
            .as_ref()
            .map(|c| c.content.as_str())
            .unwrap_or("-");
        println!(
            "  {} {:>4},{:>4} {:>4}x{:<4} opacity {:.2} {}{}",
            element.window,
            element.rect.x,
            element.rect.y,
            element.rect.width,
            element.rect.height,
            element.opacity,
            caption,
            if element.elevated { " [highlighted]" } else { "" },
        );
    }

    println!("\nselecting the highlighted window");
    effect.handle_event(HostEvent::KeyPressed {
        key: Key::Return,
        auto_repeat: false,
    });
    for command in effect.drain_commands() {
        if command != HostCommand::RepaintFull {
            println!("  [select] host command: {command:?}");
        }
    }
    pump(&mut effect, "select");
    println!("overview wound down, state: {:?}", effect.state());
    Ok(())
}

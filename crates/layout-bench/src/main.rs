use std::time::{Duration, Instant};

use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use present_wm::config::LayoutMode;
use present_wm::geometry::Rect;
use present_wm::host::WindowId;
use present_wm::layout::{self, LayoutOptions};

const MODES: [(LayoutMode, &str); 3] = [
    (LayoutMode::RegularGrid, "regular-grid"),
    (LayoutMode::FlexibleGrid, "flexible-grid"),
    (LayoutMode::Natural, "natural"),
];

#[derive(Parser, Debug)]
#[command(
    name = "layout-bench",
    version = env!("CARGO_PKG_VERSION"),
    about = "Times each layout solver over randomized window sets of growing size"
)]
struct BenchCli {
    /// Largest window count to solve for.
    #[arg(short = 'm', long = "max-windows", value_name = "COUNT", default_value_t = 64)]
    max_windows: usize,

    /// Solver invocations per measurement.
    #[arg(short = 'r', long = "repeats", value_name = "N", default_value_t = 50)]
    repeats: u32,

    /// RNG seed for window placement.
    #[arg(short = 's', long = "seed", value_name = "SEED", default_value_t = 7)]
    seed: u64,
}

fn random_windows(rng: &mut StdRng, count: usize, area: Rect) -> Vec<(WindowId, Rect)> {
    (0..count)
        .map(|i| {
            let width = rng.random_range(200..1000);
            let height = rng.random_range(150..700);
            let x = rng.random_range(area.x..(area.right() - width).max(area.x + 1));
            let y = rng.random_range(area.y..(area.bottom() - height).max(area.y + 1));
            (WindowId(i as u64), Rect::new(x, y, width, height))
        })
        .collect()
}

fn bench(mode: LayoutMode, windows: &[(WindowId, Rect)], area: Rect, repeats: u32) -> Duration {
    let options = LayoutOptions {
        accuracy: 20,
        fill_gaps: true,
    };
    let start = Instant::now();
    for _ in 0..repeats {
        let targets = layout::arrange(mode, windows, area, options);
        std::hint::black_box(&targets);
    }
    start.elapsed() / repeats
}

fn main() {
    let cli = BenchCli::parse();
    let area = Rect::new(0, 0, 2560, 1440);
    let mut rng = StdRng::seed_from_u64(cli.seed);

    println!("{:>8}  {:>14}  {:>14}  {:>14}", "windows", MODES[0].1, MODES[1].1, MODES[2].1);
    let mut count = 4;
    while count <= cli.max_windows {
        let windows = random_windows(&mut rng, count, area);
        print!("{count:>8}");
        for (mode, _) in MODES {
            let elapsed = bench(mode, &windows, area, cli.repeats);
            print!("  {:>12.1}us", elapsed.as_secs_f64() * 1e6);
        }
        println!();
        count *= 2;
    }
}

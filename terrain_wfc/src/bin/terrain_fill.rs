use std::process::ExitCode;

use tracing::{error, info};

use terrain_wfc::{
    load_generation_config_from_env, load_rule_set, Category, CategoryCatalog, GenerationConfig,
    GridPos, RenderSink, RunOutcome, TerrainGenerator,
};

/// Character grid updated as cells collapse; contradictions are marked `X`.
struct GlyphSink<'a> {
    catalog: &'a CategoryCatalog,
    width: u32,
    cells: Vec<char>,
}

impl<'a> GlyphSink<'a> {
    fn new(catalog: &'a CategoryCatalog, width: u32, height: u32) -> Self {
        Self {
            catalog,
            width,
            cells: vec!['.'; width as usize * height as usize],
        }
    }

    fn set(&mut self, pos: GridPos, glyph: char) {
        let index = pos.y as usize * self.width as usize + pos.x as usize;
        if let Some(cell) = self.cells.get_mut(index) {
            *cell = glyph;
        }
    }

    fn render(&self) -> String {
        self.cells
            .chunks(self.width as usize)
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl RenderSink for GlyphSink<'_> {
    fn on_cell_collapsed(&mut self, pos: GridPos, category: Category) {
        let glyph = self.catalog.glyph(category).unwrap_or('?');
        self.set(pos, glyph);
    }

    fn on_contradiction(&mut self, pos: GridPos) {
        self.set(pos, 'X');
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let (config, _) = load_generation_config_from_env();
    let mut config: GenerationConfig = (*config).clone();
    if let Some(seed) = std::env::args().nth(1) {
        match seed.parse() {
            Ok(seed) => config.seed = seed,
            Err(err) => {
                error!(target: "terrain_wfc::fill", %seed, error = %err, "seed.invalid");
                return ExitCode::from(2);
            }
        }
    }

    let (rules, _) = load_rule_set(config.rules_path.as_deref());
    let compiled = match rules.compile() {
        Ok(compiled) => compiled,
        Err(err) => {
            error!(target: "terrain_wfc::fill", error = %err, "rule_set.invalid");
            return ExitCode::from(2);
        }
    };
    let catalog = compiled.catalog.clone();

    let generator = match TerrainGenerator::from_compiled(&config, compiled) {
        Ok(generator) => generator,
        Err(err) => {
            error!(target: "terrain_wfc::fill", error = %err, "generator.build_failed");
            return ExitCode::from(2);
        }
    };

    let mut sink = GlyphSink::new(&catalog, config.width, config.height);
    let report = match generator.run(&mut sink) {
        Ok(report) => report,
        Err(err) => {
            error!(target: "terrain_wfc::fill", error = %err, "generator.run_failed");
            return ExitCode::from(2);
        }
    };

    println!("{}", sink.render());

    info!(
        target: "terrain_wfc::fill",
        seed = config.seed,
        steps = report.metrics.steps,
        forced_ratio = report.metrics.forced_ratio(),
        digest = report.map.as_ref().map(|map| map.digest()),
        "terrain_fill.done"
    );

    match report.outcome {
        RunOutcome::Solved => ExitCode::SUCCESS,
        RunOutcome::Contradiction { pos } => {
            eprintln!("contradiction at {pos}");
            ExitCode::from(1)
        }
        RunOutcome::BudgetExhausted { steps } => {
            eprintln!("budget exhausted after {steps} steps");
            ExitCode::from(3)
        }
    }
}

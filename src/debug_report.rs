use guideline_gherkin::{ClinicalEntity, GenerationVerbose, SentenceTrace};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const MAGENTA: &str = "\x1b[35m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

/// Print a verbose run to stderr; stdout is reserved for the feature text.
pub fn print_run(run: &GenerationVerbose, color: bool) {
    let palette = ansi::Palette::new(color);
    eprintln!(
        "\n{}",
        palette.bold(palette.paint(format!("⚙  Sentences: {}", run.sentences.len()), ansi::CYAN))
    );

    if run.sentences.is_empty() {
        eprintln!("{}", palette.dim("  No sentences found in input"));
    }
    for (idx, trace) in run.sentences.iter().enumerate() {
        print_sentence(idx, trace, &palette);
    }

    eprintln!("\n{}", palette.paint("━━━ Summary ━━━", ansi::GRAY));
    let metadata = run.generation.metadata();
    eprintln!(
        "  Records: {}  │  Scenarios: {}  │  Total: {}",
        palette.paint(run.generation.records.len().to_string(), ansi::GREEN),
        palette.paint(metadata.scenario_count.to_string(), ansi::GREEN),
        palette.dim(format!("{:?}", run.elapsed)),
    );
    eprintln!();
}

fn print_sentence(idx: usize, trace: &SentenceTrace, palette: &ansi::Palette) {
    eprintln!(
        "\n{} {}",
        palette.paint(format!("━━━ [{idx}]"), ansi::GRAY),
        palette.bold(format!("\"{}\"", trace.sentence))
    );
    eprintln!(
        "  {} {}  {} {}",
        palette.dim("active rules:"),
        palette.paint(trace.active_rules.len().to_string(), ansi::BLUE),
        palette.dim("│ candidates:"),
        palette.paint(trace.candidates.len().to_string(), ansi::BLUE),
    );

    if trace.entities.is_empty() {
        eprintln!("  {}", palette.dim("No entities tagged"));
    }
    for entity in &trace.entities {
        eprintln!("    {}", fmt_entity(entity, palette));
    }

    for record in &trace.records {
        eprintln!(
            "  {} {} {} {} {}",
            palette.paint("→", ansi::GREEN),
            palette.bold(palette.paint(&record.recommendation, ansi::GREEN)),
            palette.dim("when"),
            palette.paint(&record.situation, ansi::YELLOW),
            palette.paint(format!("[{}]", record.logic), ansi::MAGENTA),
        );
    }

    let m = &trace.metrics;
    eprintln!(
        "  {}",
        palette.dim(format!(
            "match {:?} ({} rules matched, {} dropped overlaps)  │  resolve {:?}",
            m.matching.duration, m.matching.rules_matched, m.matching.dropped_overlaps, m.resolve
        ))
    );
}

fn fmt_entity(entity: &ClinicalEntity, palette: &ansi::Palette) -> String {
    format!(
        "{} {} {}",
        palette.paint(format!("{}..{}", entity.start, entity.end), ansi::YELLOW),
        palette.paint(format!("{:<11}", entity.kind.as_str()), ansi::BLUE),
        entity.describe()
    )
}

use morphion::{
    CandidateFlags, ElementStore, EngineError, PositionGroup, SearchMetrics, SegmentationRun,
};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
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

pub fn print_run(store: &ElementStore, input: &str, run: &SegmentationRun, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Segmenting: \"{}\"", input), ansi::CYAN)));

    // Decomposition tree summary
    println!("\n{}", palette.paint("━━━ Search ━━━", ansi::GRAY));
    print_search(&run.metrics.search, &palette);

    println!("\n{}", palette.paint("━━━ Candidates ━━━", ansi::GRAY));
    if run.candidates.is_empty() {
        println!("{}", palette.dim("  No full covers reconstructed"));
    } else {
        print_candidates(run, &palette);
    }

    println!("\n{}", palette.paint("━━━ Outlines ━━━", ansi::GRAY));
    let alternatives = store.segmentation_alternatives(run.token);
    if alternatives.is_empty() {
        println!("{}", palette.dim("  Nothing registered"));
        println!("\n{}", palette.paint("Possible reasons:", ansi::YELLOW));
        println!("  • Every candidate was vetoed by a strict ordering rule");
        println!("  • A unit's link predicate failed against the sequence");
        println!("\n{}", palette.dim("  Tip: Set MORPHION_DEBUG_SEGMENTS=1 to see per-stage decisions"));
    } else {
        for (idx, outline) in alternatives.iter().enumerate() {
            let entries =
                outline.iter().map(|e| fmt_outline_entry(store, e, &palette)).collect::<Vec<_>>();
            println!(
                "  {} {}",
                palette.paint(format!("[{}]", idx), ansi::GRAY),
                entries.join(&palette.dim(" + "))
            );
        }
    }

    // Timing
    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    println!(
        "  Total: {}  │  Search: {}  │  Grammar: {}  │  Links: {}",
        palette.paint(format!("{:?}", run.metrics.total), ansi::GREEN),
        palette.paint(format!("{:?}", run.metrics.search.duration), ansi::CYAN),
        palette.dim(format!("{:?}", run.metrics.filter.duration)),
        palette.dim(format!("{:?}", run.metrics.validate.duration)),
    );
    println!();
}

/// Report for runs that legitimately found nothing to register.
pub fn print_miss(input: &str, err: &EngineError, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Segmenting: \"{}\"", input), ansi::CYAN)));
    println!("\n{}", palette.paint("━━━ Results ━━━", ansi::GRAY));
    println!("  {}", palette.dim(format!("{err}")));

    println!("\n{}", palette.paint("Possible reasons:", ansi::YELLOW));
    match err {
        EngineError::MissingStems(_) => {
            println!("  • No lexicon stem occurs in the word (stems drive the run)");
            println!("  • The word belongs to a lexicon this demo does not carry");
        }
        _ => {
            println!("  • No morpheme matches at the start of the word");
            println!("  • Matches exist but no branch covers every character");
        }
    }
    println!("\n{}", palette.dim("  Tip: Set MORPHION_DEBUG_SEGMENTS=1 to watch the search descend"));
    println!();
}

fn print_search(metrics: &SearchMetrics, palette: &ansi::Palette) {
    let covers = if metrics.success_leaves > 0 {
        palette.paint(format!("✓ {} full covers", metrics.success_leaves), ansi::GREEN)
    } else {
        palette.dim(format!("✗ {} full covers", metrics.success_leaves))
    };
    println!(
        "  {} {}",
        palette.paint(format!("{} nodes, depth {}:", metrics.nodes, metrics.max_depth), ansi::BLUE),
        covers
    );
    if metrics.failure_leaves > 0 {
        println!("    {}", palette.dim(format!("{} branches died and were recorded", metrics.failure_leaves)));
    }
}

fn print_candidates(run: &SegmentationRun, palette: &ansi::Palette) {
    for (idx, candidate) in run.candidates.iter().enumerate() {
        let units = candidate.units.join(" + ");
        let units = if candidate.flags.contains(CandidateFlags::ACCEPTED) {
            palette.bold(palette.paint(units, ansi::GREEN))
        } else {
            palette.dim(units)
        };
        println!(
            "  {} {} {} {}",
            palette.paint(format!("[{}]", idx), ansi::GRAY),
            units,
            palette.dim("│"),
            fmt_verdict(candidate.flags, candidate.registered_as, palette),
        );
    }
}

fn fmt_verdict(flags: CandidateFlags, registered_as: Option<usize>, palette: &ansi::Palette) -> String {
    let mut parts = Vec::new();
    if flags.contains(CandidateFlags::NULLS_INSERTED) {
        parts.push(palette.paint("+nulls", ansi::BLUE));
    }
    if flags.contains(CandidateFlags::STRICT_REJECTED) {
        parts.push(palette.paint("✗ strict rule", ansi::YELLOW));
    }
    if flags.contains(CandidateFlags::LINK_REJECTED) {
        parts.push(palette.paint("✗ link veto", ansi::YELLOW));
    }
    if let Some(group) = registered_as {
        parts.push(palette.paint(format!("✓ registered as [{}]", group), ansi::GREEN));
    }
    parts.join(" ")
}

fn fmt_outline_entry(
    store: &ElementStore,
    entry: &morphion::OutlineEntry,
    palette: &ansi::Palette,
) -> String {
    let name = store.unit(entry.unit).map(|u| u.name.as_str()).unwrap_or("?");
    let groups = entry
        .groups
        .iter()
        .map(|group| {
            let indices =
                group.indices().iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
            match group {
                PositionGroup::Real(_) => palette.paint(format!("({})", indices), ansi::YELLOW),
                PositionGroup::Virtual(_) => palette.dim(format!("(~{})", indices)),
            }
        })
        .collect::<Vec<_>>()
        .join("");
    if entry.attachment.is_empty() {
        format!("{}{}", palette.paint(format!("∅{}", name), ansi::BLUE), groups)
    } else {
        format!("{}{}", palette.paint(name, ansi::BLUE), groups)
    }
}

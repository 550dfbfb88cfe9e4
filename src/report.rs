use chemsift::{CompatibilityVerdict, Correction, Severity, WasteProfile};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const RED: &str = "\x1b[31m";
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

pub fn print_profile(waste: &WasteProfile, corrections: &[Correction], color: bool) {
    let palette = ansi::Palette::new(color);
    let material = &waste.material;
    let name = material.product_name.as_deref().unwrap_or("(no product name)");

    println!("\n{}", palette.bold(palette.paint(format!("⚗  {name}"), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Profile ━━━", ansi::GRAY));
    print_field(&palette, "Manufacturer", material.manufacturer.as_deref());
    println!("  {:<18} {}", "Physical state:", material.physical_state);
    if let Some(flash) = &material.flash_point {
        println!("  {:<18} {}°C / {}°F", "Flash point:", flash.celsius, flash.fahrenheit);
    } else {
        println!("  {:<18} {}", "Flash point:", palette.dim("not found"));
    }
    print_field(&palette, "Signal word", material.signal_word.as_deref());
    print_field(&palette, "UN number", material.un_number.as_deref());
    if !material.hazard_statements.is_empty() {
        println!("  {:<18} {}", "H-codes:", material.hazard_statements.join(", "));
    }

    println!("\n{}", palette.paint("━━━ Composition ━━━", ansi::GRAY));
    if material.composition.is_empty() {
        println!("{}", palette.dim("  No constituents recovered"));
    } else {
        for constituent in &material.composition {
            let cas = constituent.cas.as_deref().unwrap_or("no CAS");
            let pct = constituent.percentage.as_deref().unwrap_or("?");
            println!("  • {} {} {}", constituent.name, palette.dim(format!("[{cas}]")), pct);
        }
    }

    println!("\n{}", palette.paint("━━━ Classification ━━━", ansi::GRAY));
    let class_color = match waste.classification {
        chemsift::Classification::Hazardous => ansi::RED,
        chemsift::Classification::StateRegulated => ansi::YELLOW,
        chemsift::Classification::NotRegulated => ansi::GREEN,
    };
    println!("  {:<18} {}", "Classification:", palette.paint(waste.classification.to_string(), class_color));
    if !waste.rcra_codes.is_empty() {
        println!("  {:<18} {}", "RCRA codes:", waste.rcra_codes.join(", "));
    }
    print_field(&palette, "Form code", waste.form_code.as_deref());

    if !corrections.is_empty() {
        println!("\n{}", palette.paint("━━━ Corrections ━━━", ansi::GRAY));
        for correction in corrections {
            println!("  • {correction}");
        }
    }

    if !material.validation.missing_datapoints.is_empty() {
        println!("\n{}", palette.paint("━━━ Missing ━━━", ansi::GRAY));
        for missing in &material.validation.missing_datapoints {
            let marker = if missing.critical { palette.paint("✗", ansi::RED) } else { palette.dim("•") };
            println!("  {marker} {} {}", missing.label, palette.dim(missing.description));
        }
    }
    println!();
}

pub fn print_verdict(a: &WasteProfile, b: &WasteProfile, verdict: &CompatibilityVerdict, color: bool) {
    let palette = ansi::Palette::new(color);
    let name_a = a.material.product_name.as_deref().unwrap_or("material A");
    let name_b = b.material.product_name.as_deref().unwrap_or("material B");

    println!("{}", palette.paint("━━━ Compatibility ━━━", ansi::GRAY));
    println!("  {} + {}", palette.bold(name_a), palette.bold(name_b));

    let (label, color_code) = match verdict.severity {
        Severity::Safe => ("compatible", ansi::GREEN),
        Severity::Caution => ("compatible (low confidence)", ansi::YELLOW),
        Severity::Dangerous => ("DANGEROUS", ansi::RED),
        Severity::Prohibited => ("PROHIBITED", ansi::RED),
    };
    println!("  {} {}", palette.bold(palette.paint(label, color_code)), palette.dim(&verdict.reason));

    if let Some(emergency) = &verdict.emergency {
        println!("  {} {}", palette.paint("⚠", ansi::YELLOW), palette.bold(&emergency.warning));
        println!("    {}", emergency.response);
    }
    println!();
}

fn print_field(palette: &ansi::Palette, label: &str, value: Option<&str>) {
    match value {
        Some(value) => println!("  {:<18} {}", format!("{label}:"), value),
        None => println!("  {:<18} {}", format!("{label}:"), palette.dim("not found")),
    }
}

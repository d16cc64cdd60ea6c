use evtz::{
    DisplayFormat, DisplaySettings, EventCalendar, Instant, Separator, list_of_dates_between, monday_of_week,
    serialise_date, sunday_of_week,
};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
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

pub struct Request<'a> {
    pub inputs: &'a [String],
    pub format: Option<DisplayFormat>,
    pub separator: Separator,
    pub pattern: Option<&'a str>,
}

pub fn print_report(calendar: &EventCalendar, request: &Request<'_>, color: bool) {
    let palette = ansi::Palette::new(color);
    println!(
        "\n{}",
        palette.bold(palette.paint(format!("⚙  Event offset: {}", calendar.offset()), ansi::CYAN))
    );
    println!("  {} {}", palette.dim("Today:"), calendar.today());

    let dates: Vec<Option<Instant>> = request.inputs.iter().map(|input| resolve(calendar, input)).collect();

    for (input, date) in request.inputs.iter().zip(&dates) {
        println!("\n{}", palette.paint(format!("━━━ {input} ━━━"), ansi::GRAY));
        match date {
            Some(date) => print_date(calendar, date, request, &palette),
            None => println!("  {}", palette.paint("not a recognised date, rendered as absent", ansi::YELLOW)),
        }
    }

    if let [start, end] = dates.as_slice() {
        println!("\n{}", palette.paint("━━━ Range ━━━", ansi::GRAY));
        print_range(calendar, start.as_ref(), end.as_ref(), &palette);
    }
    println!();
}

/// Coerce first, then fall back to the serialised day layouts.
fn resolve(calendar: &EventCalendar, input: &str) -> Option<Instant> {
    calendar.coerce(input).or_else(|| calendar.deserialise_date(input))
}

fn print_date(calendar: &EventCalendar, date: &Instant, request: &Request<'_>, palette: &ansi::Palette) {
    print_row(palette, "instant", &date.to_string());
    print_row(palette, "utc", &date.to_iso_string());
    print_row(palette, "event view", &calendar.with_event_offset(date).to_string());
    print_row(palette, "event wall", &or_unrepresentable(calendar.convert_to_event_tz(date)));
    print_row(palette, "event day", &or_unrepresentable(calendar.convert_to_event_day(date)));
    let week = match (monday_of_week(date), sunday_of_week(date)) {
        (Some(monday), Some(sunday)) => format!("{} .. {}", monday.date(), sunday.date()),
        _ => "?".to_string(),
    };
    print_row(palette, "week", &week);

    println!("\n  {}", palette.bold("Presets"));
    for format in DisplayFormat::ALL {
        let settings = DisplaySettings::new(format).with_separator(request.separator);
        let rendered = calendar.display_date(date, &settings);
        if request.format == Some(format) {
            println!("  {} {}", palette.paint(format!("▶ {:<22}", format.name()), ansi::GREEN), palette.bold(rendered));
        } else {
            println!("    {:<22}{}", palette.dim(format.name()), rendered);
        }
    }
    if let Some(pattern) = request.pattern {
        println!("    {:<22}{}", palette.dim(format!("\"{pattern}\"")), calendar.display_date_with_pattern(date, pattern));
    }

    println!("\n  {}", palette.bold("Serialisation"));
    let serialised = serialise_date(date);
    let back = calendar.deserialise_date(&serialised).map(|d| d.to_string()).unwrap_or_else(|| "?".to_string());
    print_row(palette, "serialised", &serialised);
    print_row(palette, "read back", &back);

    println!("\n  {}", palette.bold("Today"));
    let status = if calendar.is_today(date) {
        palette.paint("today", ansi::GREEN)
    } else if calendar.is_before_today(date) {
        palette.paint("before today", ansi::YELLOW)
    } else {
        palette.paint("after today", ansi::CYAN)
    };
    print_row(palette, "status", &status);
}

fn print_range(calendar: &EventCalendar, start: Option<&Instant>, end: Option<&Instant>, palette: &ansi::Palette) {
    print_row(palette, "times", &calendar.display_date_range(start, end, None));

    let (Some(start), Some(end)) = (start, end) else {
        println!("  {}", palette.dim("one side is absent"));
        return;
    };
    if let Err(err) = evtz::ensure_ordered(start, end) {
        println!("  {}", palette.paint(err.to_string(), ansi::YELLOW));
        return;
    }

    let days = list_of_dates_between(start, end);
    let today_inside = calendar.is_between_dates(calendar.today(), start, end);
    print_row(palette, "days", &days.len().to_string());
    print_row(palette, "covers today", &today_inside.to_string());
    for day in days.iter().take(14) {
        println!("    {}", palette.dim(calendar.display_date(day, &DisplaySettings::default())));
    }
    if days.len() > 14 {
        println!("    {}", palette.dim(format!("… {} more", days.len() - 14)));
    }
}

fn or_unrepresentable(date: Option<Instant>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "?".to_string())
}

fn print_row(palette: &ansi::Palette, label: &str, value: &str) {
    println!("  {:<14}{}", palette.dim(format!("{label}:")), value);
}

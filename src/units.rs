//! Unit-of-measure table.
//!
//! Maps the spellings accepted after a number or expression onto a canonical
//! unit name. Words that are not in the table are still accepted as units by
//! the parser, they are just kept as written.

/// A known unit and the spellings that resolve to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unit {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
}

const UNITS: &[Unit] = &[
    // Temperature
    Unit { name: "degC", aliases: &["°C", "°c", "degC", "celsius", "Celsius"] },
    Unit { name: "degF", aliases: &["°F", "°f", "degF", "fahrenheit", "Fahrenheit"] },
    Unit { name: "K", aliases: &["K", "kelvin"] },
    Unit { name: "deltaDegC", aliases: &["deltaDegC", "Δ°C"] },
    Unit { name: "deltaDegF", aliases: &["deltaDegF", "Δ°F"] },
    // Ratio
    Unit { name: "%", aliases: &["%", "percent"] },
    Unit { name: "ppm", aliases: &["ppm"] },
    // Time
    Unit { name: "ms", aliases: &["ms", "millisecond", "milliseconds"] },
    Unit { name: "s", aliases: &["s", "sec", "secs", "second", "seconds"] },
    Unit { name: "min", aliases: &["min", "mins", "minute", "minutes"] },
    Unit { name: "h", aliases: &["h", "hr", "hrs", "hour", "hours"] },
    Unit { name: "d", aliases: &["d", "day", "days"] },
    Unit { name: "week", aliases: &["week", "weeks", "wk"] },
    // Length and area
    Unit { name: "mm", aliases: &["mm"] },
    Unit { name: "cm", aliases: &["cm"] },
    Unit { name: "m", aliases: &["m", "meter", "meters", "metre", "metres"] },
    Unit { name: "km", aliases: &["km"] },
    Unit { name: "ft", aliases: &["ft", "feet", "foot"] },
    Unit { name: "in", aliases: &["in", "inch", "inches"] },
    Unit { name: "m2", aliases: &["m2", "m²", "sqm"] },
    Unit { name: "ft2", aliases: &["ft2", "ft²", "sqft"] },
    // Flow
    Unit { name: "lps", aliases: &["lps", "L/s"] },
    Unit { name: "cfm", aliases: &["cfm", "CFM"] },
    Unit { name: "gpm", aliases: &["gpm", "GPM"] },
    Unit { name: "m3/h", aliases: &["m3/h", "cmh"] },
    // Pressure
    Unit { name: "Pa", aliases: &["Pa", "pa", "pascal"] },
    Unit { name: "kPa", aliases: &["kPa", "kpa"] },
    Unit { name: "bar", aliases: &["bar"] },
    Unit { name: "psi", aliases: &["psi", "PSI"] },
    Unit { name: "inH2O", aliases: &["inH2O", "inWC"] },
    // Energy and power
    Unit { name: "W", aliases: &["W", "watt", "watts"] },
    Unit { name: "kW", aliases: &["kW", "kw", "kilowatt", "kilowatts"] },
    Unit { name: "MW", aliases: &["MW"] },
    Unit { name: "Wh", aliases: &["Wh"] },
    Unit { name: "kWh", aliases: &["kWh", "kwh"] },
    Unit { name: "MWh", aliases: &["MWh"] },
    Unit { name: "BTU", aliases: &["BTU", "btu"] },
    Unit { name: "tonref", aliases: &["tonref", "TR"] },
    // Electrical
    Unit { name: "V", aliases: &["V", "volt", "volts"] },
    Unit { name: "A", aliases: &["A", "amp", "amps"] },
    Unit { name: "Hz", aliases: &["Hz", "hz"] },
    // Speed
    Unit { name: "rpm", aliases: &["rpm", "RPM"] },
    Unit { name: "m/s", aliases: &["m/s", "mps"] },
    // Light and air
    Unit { name: "lux", aliases: &["lux", "lx"] },
    Unit { name: "ppb", aliases: &["ppb"] },
    Unit { name: "µg/m3", aliases: &["µg/m3", "ug/m3"] },
    // Money
    Unit { name: "€", aliases: &["€", "EUR"] },
    Unit { name: "$", aliases: &["$", "USD"] },
];

/// Looks up a unit by any of its spellings. Matching is case-sensitive (`m`
/// is metres, `M` is not a unit).
pub fn lookup(text: &str) -> Option<&'static Unit> {
    UNITS.iter().find(|unit| unit.aliases.contains(&text))
}

/// The canonical name for `text`, or `text` itself when it is not a known unit.
pub fn canonical(text: &str) -> String {
    lookup(text)
        .map(|unit| unit.name.to_string())
        .unwrap_or_else(|| text.to_string())
}

/// All known units.
pub fn all() -> &'static [Unit] {
    UNITS
}

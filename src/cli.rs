// Command line interface module
// Handles parsing of command line arguments

use clap::{Parser, ValueEnum};
use wallkit::FadeCurve;

/// wallkit - live wallpaper and demo launcher for Wayland
#[derive(Parser, Debug)]
#[command(name = "wallkit")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Example to start directly, skipping the picker (case-sensitive)
    #[arg(value_name = "EXAMPLE")]
    pub example: Option<String>,

    /// Print the registered examples and exit
    #[arg(short, long, default_value = "false")]
    pub list: bool,

    /// Seconds the fade overlay stays opaque before fading
    #[arg(long, default_value = "0.5", value_parser = parse_seconds, allow_negative_numbers = true)]
    pub fade_delay: f32,

    /// Seconds the fade overlay takes to become transparent
    #[arg(long, default_value = "1.5", value_parser = parse_fade_time)]
    pub fade_time: f32,

    /// Easing used by the fade overlay
    #[arg(long, value_enum, default_value_t = CurveArg::Fade)]
    pub fade_curve: CurveArg,

    /// Run the parallax demo as a wallpaper on the background layer
    #[arg(short, long, default_value = "false")]
    pub wallpaper: bool,

    /// Report the wallpaper as running in preview mode
    #[arg(long, default_value = "false", requires = "wallpaper")]
    pub preview: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CurveArg {
    Fade,
    Smootherstep,
    Linear,
}

impl From<CurveArg> for FadeCurve {
    fn from(arg: CurveArg) -> Self {
        match arg {
            CurveArg::Fade => FadeCurve::Fade,
            CurveArg::Smootherstep => FadeCurve::Smootherstep,
            CurveArg::Linear => FadeCurve::Linear,
        }
    }
}

/// Parse a duration in seconds; any finite value is accepted
fn parse_seconds(s: &str) -> Result<f32, String> {
    let seconds: f32 = s.parse().map_err(|_| "Invalid number of seconds")?;
    if !seconds.is_finite() {
        return Err("Seconds must be a finite number".to_string());
    }
    Ok(seconds)
}

/// Parse fade time and ensure it's positive
fn parse_fade_time(s: &str) -> Result<f32, String> {
    let seconds = parse_seconds(s)?;
    if seconds <= 0.0 {
        return Err("Fade time must be greater than 0".to_string());
    }
    Ok(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["wallkit"]).unwrap();
        assert_eq!(args.example, None);
        assert!(!args.list);
        assert_eq!(args.fade_delay, 0.5);
        assert_eq!(args.fade_time, 1.5);
        assert_eq!(args.fade_curve, CurveArg::Fade);
        assert!(!args.wallpaper);
    }

    #[test]
    fn example_and_fade_options() {
        let args = Args::try_parse_from([
            "wallkit",
            "FaderTest",
            "--fade-delay",
            "-1",
            "--fade-time",
            "2.5",
            "--fade-curve",
            "smootherstep",
        ])
        .unwrap();
        assert_eq!(args.example.as_deref(), Some("FaderTest"));
        assert_eq!(args.fade_delay, -1.0);
        assert_eq!(args.fade_time, 2.5);
        assert_eq!(FadeCurve::from(args.fade_curve), FadeCurve::Smootherstep);
    }

    #[test]
    fn rejects_non_positive_fade_time() {
        assert!(Args::try_parse_from(["wallkit", "--fade-time", "0"]).is_err());
        assert!(Args::try_parse_from(["wallkit", "--fade-time", "abc"]).is_err());
        assert!(Args::try_parse_from(["wallkit", "--fade-delay", "inf"]).is_err());
    }

    #[test]
    fn preview_requires_wallpaper() {
        assert!(Args::try_parse_from(["wallkit", "--preview"]).is_err());
        let args = Args::try_parse_from(["wallkit", "--wallpaper", "--preview"]).unwrap();
        assert!(args.preview);
    }
}

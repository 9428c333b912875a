//! Argument construction for the converter and exiftool steps.

use std::path::Path;

use super::ToolStep;
use crate::config::{CoreConfig, TargetFormat};

/// exiftool invocation removing all embedded metadata from `source` in place.
pub fn strip_metadata_step(config: &CoreConfig, source: &Path) -> ToolStep {
    ToolStep::new(&config.tools.exiftool)
        .arg("-overwrite_original")
        .arg("-all=")
        .arg(source)
}

/// Converter invocation writing `source` encoded as the target format to `output`.
pub fn convert_step(config: &CoreConfig, format: TargetFormat, source: &Path, output: &Path) -> ToolStep {
    let quality = config.quality.to_string();
    let encoder = config.tools.encoder_for(format);

    match format {
        TargetFormat::Jpg => ToolStep::new(encoder)
            .arg(source)
            .arg(output)
            .arg("-q")
            .arg(quality)
            .arg("--chroma_subsampling")
            .arg(&config.chroma_subsampling),
        TargetFormat::Webp => ToolStep::new(encoder)
            .arg("-q")
            .arg(quality)
            .arg(source)
            .arg("-o")
            .arg(output),
        TargetFormat::Avif => ToolStep::new(encoder)
            .arg("-q")
            .arg(quality)
            .arg("-y")
            .arg(&config.chroma_subsampling)
            .arg(source)
            .arg(output),
    }
}

/// exiftool invocation marking `target` as processed.
pub fn tag_step(config: &CoreConfig, target: &Path) -> ToolStep {
    ToolStep::new(&config.tools.exiftool)
        .arg("-overwrite_original")
        .arg(&config.metadata_tag)
        .arg(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(step: &ToolStep) -> Vec<String> {
        step.display_args()
    }

    #[test]
    fn test_jpeg_convert_arguments() {
        let config = CoreConfig::default();
        let step = convert_step(
            &config,
            TargetFormat::Jpg,
            Path::new("in/a.png"),
            Path::new("out/a.jpg.tmp"),
        );
        assert_eq!(step.program, "cjpegli");
        assert_eq!(
            args(&step),
            ["in/a.png", "out/a.jpg.tmp", "-q", "90", "--chroma_subsampling", "444"]
        );
    }

    #[test]
    fn test_webp_and_avif_use_their_encoders() {
        let config = CoreConfig::default();
        let webp = convert_step(&config, TargetFormat::Webp, Path::new("a.png"), Path::new("a.webp.tmp"));
        assert_eq!(webp.program, "cwebp");
        assert_eq!(args(&webp), ["-q", "90", "a.png", "-o", "a.webp.tmp"]);

        let avif = convert_step(&config, TargetFormat::Avif, Path::new("a.png"), Path::new("a.avif.tmp"));
        assert_eq!(avif.program, "avifenc");
        assert_eq!(args(&avif), ["-q", "90", "-y", "444", "a.png", "a.avif.tmp"]);
    }

    #[test]
    fn test_exiftool_steps() {
        let config = CoreConfig::default();
        let strip = strip_metadata_step(&config, Path::new("a.jpg"));
        assert_eq!(strip.program, "exiftool");
        assert_eq!(args(&strip), ["-overwrite_original", "-all=", "a.jpg"]);

        let tag = tag_step(&config, Path::new("a.jpg.tmp"));
        assert_eq!(
            args(&tag),
            ["-overwrite_original", "-xmp:description=compressed", "a.jpg.tmp"]
        );
    }
}

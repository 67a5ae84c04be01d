use std::path::Path;

use anyhow::Result;
use clap::Parser;
use mb_core::config::ConvertConfig;
use mb_export::preview::{PreviewOptions, render_halfblock};
use mb_source::{AnimationSource, GlyphRasterizer, GlyphSource, ImageSource, TargetSize};

pub mod cli;
pub mod pipeline;

use cli::{Command, ConvertArgs};
use pipeline::Sinks;

/// Config chargée automatiquement si présente dans le dossier courant.
const DEFAULT_CONFIG: &str = "monobit.toml";

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Charger la config
    let mut config = resolve_config(cli.config.as_deref())?;

    // 4. Dispatcher
    match cli.command {
        Command::Image { path, convert } => {
            convert.apply(&mut config)?;
            let target = TargetSize::from_options(config.width, config.height);
            let mut source = ImageSource::open(&path, target)?;
            let conversion = pipeline::convert_single(&mut source, &config)?;
            pipeline::emit(&conversion, &sinks(convert), &config)
        }
        Command::Anim { path, convert } => {
            convert.apply(&mut config)?;
            let target = TargetSize::from_options(config.width, config.height);
            let mut source = AnimationSource::open(&path, target)?;
            let conversion = pipeline::convert_sequence(&mut source, &config)?;
            pipeline::emit(&conversion, &sinks(convert), &config)
        }
        Command::Text {
            text,
            font,
            size,
            cells,
            convert,
        } => {
            if text.is_empty() {
                anyhow::bail!("Texte vide");
            }
            // Les glyphes sont rendus à la taille de police, pas à la largeur de la config.
            config.width = None;
            config.height = None;
            convert.apply(&mut config)?;
            let target = TargetSize::from_options(config.width, config.height);
            let rasterizer = GlyphRasterizer::from_file(&font, size)?;
            let conversion = if cells {
                let mut source = GlyphSource::cells(&rasterizer, &text, target)?;
                pipeline::convert_sequence(&mut source, &config)?
            } else {
                let mut source = GlyphSource::text(&rasterizer, &text, target)?;
                pipeline::convert_single(&mut source, &config)?
            };
            pipeline::emit(&conversion, &sinks(convert), &config)
        }
        Command::Decode {
            input,
            width,
            height,
            scheme,
            preview_png,
            scale,
        } => {
            if let Some(v) = scale {
                config.preview_scale = v;
                config.clamp_all();
            }
            let scheme = scheme.map_or(config.scheme, Into::into);
            let text = pipeline::read_input(&input)?;
            let grids = pipeline::decode(&text, (width, height), scheme)?;
            for (i, grid) in grids.iter().enumerate() {
                if grids.len() > 1 {
                    println!("frame {i}");
                }
                print!("{}", render_halfblock(grid));
            }
            if let Some(path) = preview_png {
                pipeline::write_pngs(&grids, &PreviewOptions::from(&config), &path)?;
            }
            Ok(())
        }
    }
}

fn sinks(convert: ConvertArgs) -> Sinks {
    Sinks {
        output: convert.output,
        preview: convert.preview,
        preview_png: convert.preview_png,
    }
}

/// Resolve config: --config must exist; otherwise monobit.toml if present, else defaults.
fn resolve_config(path: Option<&Path>) -> Result<ConvertConfig> {
    if let Some(path) = path {
        return mb_core::config::load_config(path);
    }
    let default = Path::new(DEFAULT_CONFIG);
    if default.exists() {
        mb_core::config::load_config(default)
    } else {
        log::debug!("Pas de {DEFAULT_CONFIG}, utilisation des défauts.");
        Ok(ConvertConfig::default())
    }
}

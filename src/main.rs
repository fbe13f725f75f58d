use cel_to_png::{probe, CelError, Decoder, Family, FrameKind, Palette};
use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

const TARGET: &str = "new";

#[derive(Parser, Debug, Clone)]
#[command(name = "cel-to-png", version, about = "Extract CEL/CL2 sprite frames as PNG")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Decode every frame of a file, or of every file in a directory
    Decode {
        path: PathBuf,

        /// Raw 768 byte .pal file; grayscale when omitted
        #[arg(short, long)]
        palette: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = FamilyArg::Auto)]
        family: FamilyArg,

        /// Only decode this frame
        #[arg(long)]
        frame: Option<usize>,

        #[arg(short, long, default_value = TARGET)]
        out: PathBuf,

        #[arg(short, long, default_value_t = 1)]
        threads: usize,
    },
    /// List the frame table of a file
    Info {
        file: PathBuf,

        #[arg(long, value_enum, default_value_t = FamilyArg::Auto)]
        family: FamilyArg,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum FamilyArg {
    /// `.cl2` is headered, anything else flat
    Auto,
    Flat,
    Headered,
}

impl FamilyArg {
    fn resolve(self, path: &Path) -> Family {
        match self {
            FamilyArg::Auto => Family::from_path(path),
            FamilyArg::Flat => Family::Flat,
            FamilyArg::Headered => Family::Headered,
        }
    }
}

struct DecodeOptions {
    palette: Palette,
    family: FamilyArg,
    frame: Option<usize>,
    out: PathBuf,
}

fn load(path: &Path, family: FamilyArg) -> anyhow::Result<Decoder<'static>> {
    let file = fs::read(path)?;

    Ok(Decoder::load(file, family.resolve(path))?)
}

/// Writes `<out>/<stem>/<index>.png` per frame, returns how many were written.
fn process_file(path: &Path, options: &DecodeOptions) -> anyhow::Result<usize> {
    info!("{}", path.display());

    let decoder = load(path, options.family)?;

    let filename = match path.file_stem().and_then(|stem| stem.to_str()) {
        Some(x) => x,
        None => return Err(anyhow::anyhow!("failed to get file stem")),
    };

    let target = options.out.join(filename);
    fs::create_dir_all(&target)?;

    let indices: Vec<usize> = match options.frame {
        Some(index) if index < decoder.frame_count() => vec![index],
        Some(index) => {
            return Err(CelError::Index {
                index,
                count: decoder.frame_count(),
            }
            .into())
        }
        None => (0..decoder.frame_count()).collect(),
    };

    let mut written = 0;

    for index in indices {
        let frame = match decoder.decode_frame(index, &options.palette) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("{}: frame {index}: {e}", path.display());
                continue;
            }
        };

        let image = frame
            .to_image()
            .ok_or_else(|| anyhow::anyhow!("frame {index} does not fit its dimensions"))?;

        image.save(target.join(format!("{index}.png")))?;
        written += 1;
    }

    Ok(written)
}

fn collect_entries(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entryw = entry?;
        let fpath = entryw.path();

        let meta = entryw.metadata()?;
        let fname = match fpath.file_name() {
            Some(s) => s.to_str().unwrap_or(""),
            None => continue,
        };

        if meta.is_dir() || fname.starts_with('.') {
            continue;
        }

        entries.push(fpath);
    }

    entries.sort();

    Ok(entries)
}

fn decode(path: &Path, options: DecodeOptions, threads: usize) -> anyhow::Result<()> {
    if path.is_file() {
        let written = process_file(path, &options)?;
        info!("{written} frames written");

        return Ok(());
    }

    let entries = collect_entries(path)?;

    if entries.is_empty() {
        return Ok(());
    }

    let chunk_size = entries.len().div_ceil(threads.max(1));
    let options = &options;

    thread::scope(|s| {
        let threads: Vec<_> = entries
            .chunks(chunk_size)
            .map(|chunk| {
                s.spawn(move || {
                    let mut success = 0;

                    for fpath in chunk {
                        match process_file(fpath, options) {
                            Ok(_) => success += 1,
                            Err(e) => error!("{}: {e}", fpath.display()),
                        };
                    }

                    success
                })
            })
            .collect();

        let sum = threads
            .into_iter()
            .fold(0, |pv, thread| pv + thread.join().unwrap_or(0));

        info!("{}/{} success", sum, entries.len());
    });

    Ok(())
}

fn print_info(path: &Path, family: FamilyArg) -> anyhow::Result<()> {
    let decoder = load(path, family)?;

    println!("{:?}, {} frames", decoder.family(), decoder.frame_count());

    for (index, descriptor) in decoder.descriptors().iter().enumerate() {
        let bytes = decoder.frame_bytes(index)?;
        let kind = decoder.kind(index)?;

        let probe = match kind {
            FrameKind::Flat => probe::headerless_width(bytes)
                .map(|width| format!(" (line width guess {width})"))
                .unwrap_or_default(),
            _ => String::new(),
        };

        println!(
            "{index:5} offset {:8} length {:6} {kind}{probe}",
            descriptor.offset, descriptor.length
        );
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match args.command {
        Command::Decode {
            path,
            palette,
            family,
            frame,
            out,
            threads,
        } => {
            let palette = match palette {
                Some(file) => Palette::open(file)?,
                None => Palette::grayscale(),
            };

            let options = DecodeOptions {
                palette,
                family,
                frame,
                out,
            };

            decode(&path, options, threads)
        }
        Command::Info { file, family } => print_info(&file, family),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn flat_blob() -> Vec<u8> {
        // one frame of two 32 pixel lines
        let mut blob = vec![1, 0, 0, 0, 12, 0, 0, 0, 20, 0, 0, 0];
        blob.extend([0x02, 0x01, 0x02, 0xE2, 0x02, 0x01, 0x02, 0xE2]);

        blob
    }

    fn options(out: &Path) -> DecodeOptions {
        DecodeOptions {
            palette: Palette::grayscale(),
            family: FamilyArg::Auto,
            frame: None,
            out: out.to_path_buf(),
        }
    }

    #[test]
    fn writes_png_per_frame() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tile.cel");
        fs::write(&input, flat_blob()).unwrap();

        let out = dir.path().join("out");
        let written = process_file(&input, &options(&out)).unwrap();

        assert_eq!(written, 1);

        let image = image::open(out.join("tile").join("0.png")).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (32, 2));
        assert_eq!(image.get_pixel(1, 0).0, [2, 2, 2, 255]);
        assert_eq!(image.get_pixel(5, 1).0[3], 0);
    }

    #[test]
    fn frame_past_count_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tile.cel");
        fs::write(&input, flat_blob()).unwrap();

        let mut options = options(&dir.path().join("out"));
        options.frame = Some(1);

        let err = process_file(&input, &options).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<CelError>(),
            Some(CelError::Index { index: 1, count: 1 })
        ));

        options.frame = Some(0);
        assert_eq!(process_file(&input, &options).unwrap(), 1);
    }

    #[test]
    fn skips_dotfiles_and_dirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.cel"), flat_blob()).unwrap();
        fs::write(dir.path().join("a.cl2"), flat_blob()).unwrap();
        fs::write(dir.path().join(".hidden"), b"").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let entries = collect_entries(dir.path()).unwrap();
        let names: Vec<_> = entries
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_owned())
            .collect();

        assert_eq!(names, vec!["a.cl2", "b.cel"]);
    }

    #[test]
    fn family_override() {
        let path = Path::new("x.cel");

        assert_eq!(FamilyArg::Auto.resolve(path), Family::Flat);
        assert_eq!(FamilyArg::Headered.resolve(path), Family::Headered);
    }
}

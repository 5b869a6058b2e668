use std::error::Error;
use std::fs;
use std::path::Path;

use image::{GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use tempfile::tempdir;
use tryduck::trailer::{is_tagged, split_trailer, TAG};
use tryduck::{
    restore_image, shuffle_image, Grid, Metadata, RestoreOptions, ShuffleOptions, Source,
};

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 3) as u8, (y * 5) as u8, ((x + y) * 7) as u8])
    })
}

fn shuffle_opts(
    input: &Path,
    output: &Path,
    password: &str,
    rows: usize,
    cols: usize,
) -> ShuffleOptions {
    ShuffleOptions {
        source: Source::Path(input.to_owned()),
        output: output.to_owned(),
        password: password.into(),
        grid: Grid::new(rows, cols).unwrap(),
        ..Default::default()
    }
}

fn restore_opts(input: &Path, output: &Path, password: &str) -> RestoreOptions {
    RestoreOptions {
        input: input.to_owned(),
        output: output.to_owned(),
        password: password.into(),
    }
}

#[test]
fn shuffle_then_restore_is_exact() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("input.png");
    let shuffled = dir.path().join("shuffled.png");
    let restored = dir.path().join("restored.png");

    let original = gradient(77, 101);
    original.save(&input)?;

    shuffle_image(&shuffle_opts(&input, &shuffled, "duck123", 10, 10))?;

    let bytes = fs::read(&shuffled)?;
    assert!(is_tagged(&bytes));
    let (image, sealed) = split_trailer(&bytes, TAG)?;

    // The image part alone is a valid, padded PNG.
    let padded = image::load_from_memory_with_format(image, ImageFormat::Png)?;
    assert_eq!((padded.width(), padded.height()), (80, 110));
    assert_ne!(padded.to_rgb8().as_raw(), original.as_raw());

    let meta = Metadata::open(sealed, "duck123")?;
    assert_eq!((meta.rows, meta.cols), (10, 10));
    assert_eq!((meta.original_height, meta.original_width), (101, 77));

    restore_image(&restore_opts(&shuffled, &restored, "duck123"))?;
    let back = image::open(&restored)?.to_rgb8();
    assert_eq!(back.dimensions(), (77, 101));
    assert_eq!(back, original);

    Ok(())
}

#[test]
fn grayscale_duck_scenario() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("ramp.png");
    let shuffled = dir.path().join("ramp.shuffled.png");
    let restored = dir.path().join("ramp.restored.png");

    let original = GrayImage::from_fn(8, 8, |x, y| Luma([(y * 8 + x) as u8]));
    original.save(&input)?;

    let options = ShuffleOptions {
        seed: Some("pond".into()),
        ..shuffle_opts(&input, &shuffled, "duck123", 4, 4)
    };
    shuffle_image(&options)?;

    let bytes = fs::read(&shuffled)?;
    let (image, sealed) = split_trailer(&bytes, TAG)?;
    let meta = Metadata::open(sealed, "duck123")?;
    assert!(!meta.permutation.is_identity());

    let scrambled = image::load_from_memory(image)?.to_luma8();
    for k in 0..16u32 {
        let from = meta.permutation.as_slice()[k as usize] as u32;
        let (x, y) = (k % 4 * 2, k / 4 * 2);
        let (fx, fy) = (from % 4 * 2, from / 4 * 2);
        for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(
                scrambled.get_pixel(x + dx, y + dy),
                original.get_pixel(fx + dx, fy + dy)
            );
        }
    }

    restore_image(&restore_opts(&shuffled, &restored, "duck123"))?;
    assert_eq!(image::open(&restored)?.to_luma8(), original);

    Ok(())
}

#[test]
fn same_seed_same_order() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("input.png");
    gradient(40, 30).save(&input)?;

    let mut orders = Vec::new();
    for name in ["a.png", "b.png"] {
        let out = dir.path().join(name);
        let options = ShuffleOptions {
            seed: Some("fixed".into()),
            ..shuffle_opts(&input, &out, "pw", 5, 5)
        };
        shuffle_image(&options)?;

        let bytes = fs::read(&out)?;
        let (image, sealed) = split_trailer(&bytes, TAG)?;
        orders.push((image.to_vec(), Metadata::open(sealed, "pw")?.permutation));
    }
    assert_eq!(orders[0], orders[1]);

    Ok(())
}

#[test]
fn wrong_password_is_rejected() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("input.png");
    let shuffled = dir.path().join("shuffled.png");
    let restored = dir.path().join("restored.png");
    gradient(20, 20).save(&input)?;

    shuffle_image(&shuffle_opts(&input, &shuffled, "A", 4, 4))?;
    let err = restore_image(&restore_opts(&shuffled, &restored, "B")).unwrap_err();
    assert!(matches!(err, tryduck::Error::Authentication), "{err}");
    assert!(!restored.exists(), "no output on failure");

    Ok(())
}

#[test]
fn untagged_file_is_unrecognized() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("plain.png");
    let restored = dir.path().join("restored.png");
    gradient(10, 10).save(&input)?;

    let err = restore_image(&restore_opts(&input, &restored, "pw")).unwrap_err();
    assert!(matches!(err, tryduck::Error::UnrecognizedFormat), "{err}");
    assert!(!restored.exists());

    Ok(())
}

#[test]
fn grid_larger_than_image() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("tiny.png");
    let output = dir.path().join("out.png");
    gradient(3, 3).save(&input)?;

    let err = shuffle_image(&shuffle_opts(&input, &output, "pw", 4, 4)).unwrap_err();
    assert!(matches!(err, tryduck::Error::InvalidGrid { .. }), "{err}");
    assert!(!output.exists());

    Ok(())
}

#[test]
fn existing_output_is_untouched() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("input.png");
    let sentinel = dir.path().join("sentinel.png");
    fs::write(&sentinel, b"sentinel")?;

    // Input doesn't even exist: the output check must come first.
    let err = shuffle_image(&shuffle_opts(&input, &sentinel, "pw", 2, 2)).unwrap_err();
    assert!(matches!(err, tryduck::Error::OutputExists(_)), "{err}");

    let err = restore_image(&restore_opts(&input, &sentinel, "pw")).unwrap_err();
    assert!(matches!(err, tryduck::Error::OutputExists(_)), "{err}");

    assert_eq!(fs::read(&sentinel)?, b"sentinel");

    Ok(())
}

#[test]
fn undecodable_input() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("input.png");
    let output = dir.path().join("out.png");
    fs::write(&input, b"this is not an image")?;

    let err = shuffle_image(&shuffle_opts(&input, &output, "pw", 2, 2)).unwrap_err();
    assert!(matches!(err, tryduck::Error::Decode(_)), "{err}");
    assert!(!output.exists());

    Ok(())
}

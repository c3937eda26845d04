//! Image file to JSON command line, through configuration and the runtime

use chaser_core::{ChaserConfig, Command, PixelMatch};
use chaser_drive::{frame_channel, FrameHandler, FrameLoop, JsonLinesSink};
use image::{GrayImage, Luma, Rgb, RgbImage};
use std::io::Write;
use std::sync::Arc;

fn gray_row(width: u32, lit: &[u32], value: u8) -> GrayImage {
    let mut image = GrayImage::from_pixel(width, 1, Luma([10]));
    for &x in lit {
        image.put_pixel(x, 0, Luma([value]));
    }
    image
}

fn commands_from(output: &[u8]) -> Vec<Command> {
    std::str::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn test_png_frames_through_runtime() {
    let dir = tempfile::tempdir().unwrap();
    let names = ["00_left.png", "01_center.png", "02_right.png", "03_empty.png"];
    let images = [
        gray_row(9, &[1, 2], 255),
        gray_row(9, &[4, 5], 255),
        gray_row(9, &[7, 8], 255),
        gray_row(9, &[], 255),
    ];
    for (name, image) in names.iter().zip(images.iter()) {
        image.save(dir.path().join(name)).unwrap();
    }

    let sink = Arc::new(JsonLinesSink::new(Vec::new()));
    let handler = Arc::new(FrameHandler::from_config(&ChaserConfig::default(), sink.clone()).unwrap());
    let (sender, mut source) = frame_channel(ChaserConfig::default().runtime.frame_queue_depth);
    for name in names {
        let frame = chaser_eye::frame_from_path(dir.path().join(name)).unwrap();
        assert!(sender.offer(frame));
    }
    drop(sender);

    let handled = FrameLoop::new(handler.clone()).run(&mut source).await;
    assert_eq!(handled, 4);
    drop(handler);

    let output = Arc::try_unwrap(sink).ok().unwrap().into_inner();
    assert_eq!(
        commands_from(&output),
        vec![
            Command::new(0.0, 0.5),
            Command::new(0.4, 0.0),
            Command::new(0.0, -0.5),
            Command::STOP,
        ]
    );
}

#[test]
fn test_rgb_image_scans_channel_bytes() {
    // Three pixels give a stride of nine bytes; the red byte of pixel 0 and
    // the green byte of pixel 0 are indices 0 and 1, both in the left zone
    let mut image = RgbImage::from_pixel(3, 1, Rgb([10, 10, 10]));
    image.put_pixel(0, 0, Rgb([255, 255, 10]));
    let frame = chaser_eye::frame_from_image(&image::DynamicImage::ImageRgb8(image)).unwrap();

    let sink = Arc::new(JsonLinesSink::new(Vec::new()));
    let handler = FrameHandler::new(sink.clone(), Default::default(), Default::default());
    assert_eq!(handler.process(&frame).unwrap(), Command::new(0.0, 0.5));
}

#[test]
fn test_config_file_changes_behavior() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[thresholds]
brightness_threshold = 200
linear_speed = 0.8

[locator]
matching = "at_least"
"#
    )
    .unwrap();

    let config = ChaserConfig::from_file(file.path()).unwrap();
    assert_eq!(config.locator.matching, PixelMatch::AtLeast);

    let sink = Arc::new(JsonLinesSink::new(Vec::new()));
    let handler = FrameHandler::from_config(&config, sink).unwrap();

    // 230 is not 200, but it is at least 200
    let image = gray_row(9, &[3, 6], 230);
    let frame = chaser_eye::frame_from_image(&image::DynamicImage::ImageLuma8(image)).unwrap();
    assert_eq!(handler.process(&frame).unwrap(), Command::new(0.8, 0.0));
}

#[test]
fn test_exact_matching_ignores_brighter_pixels() {
    let sink = Arc::new(JsonLinesSink::new(Vec::new()));
    let mut config = ChaserConfig::default();
    config.thresholds.brightness_threshold = 200;
    let handler = FrameHandler::from_config(&config, sink).unwrap();

    let image = gray_row(9, &[3, 6], 230);
    let frame = chaser_eye::frame_from_image(&image::DynamicImage::ImageLuma8(image)).unwrap();
    assert_eq!(handler.process(&frame).unwrap(), Command::STOP);
}

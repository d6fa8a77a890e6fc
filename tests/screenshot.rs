use prismboy::screenshot;
use tempfile::tempdir;

#[test]
fn frame_converts_to_rgb_pixels() {
    let mut frame = vec![0u32; 160 * 144];
    frame[0] = 0x00123456;
    frame[160 * 144 - 1] = 0x00FFFFFF;

    let img = screenshot::frame_to_image(&frame);
    assert_eq!(img.dimensions(), (160, 144));
    assert_eq!(img.get_pixel(0, 0).0, [0x12, 0x34, 0x56]);
    assert_eq!(img.get_pixel(159, 143).0, [0xFF, 0xFF, 0xFF]);
}

#[test]
fn png_is_written_to_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("frame.png");
    screenshot::save_png(&vec![0x009BBC0F; 160 * 144], &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
}

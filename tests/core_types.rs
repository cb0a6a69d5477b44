use screenmatch::image::color::{argb, rgb, TRANSPARENT};
use screenmatch::{PixelImage, Position, ScreenMatchError, Section};

fn numbered(width: usize, height: usize) -> PixelImage {
    PixelImage::from_fn(width, height, |x, y| rgb(x as u8, y as u8, (x * y) as u8)).unwrap()
}

#[test]
fn pixel_image_rejects_mismatched_buffer() {
    let err = PixelImage::new(vec![0; 5], 2, 3).err().unwrap();
    assert_eq!(err, ScreenMatchError::BufferSizeMismatch { expected: 6, got: 5 });
    assert!(err.is_invalid_argument());
}

#[test]
fn zero_sized_images_are_allowed() {
    let image = PixelImage::new(Vec::new(), 0, 4).unwrap();
    assert!(image.is_empty());
    assert_eq!(image.height(), 4);
    assert!(image.column(0).err().unwrap().is_out_of_bounds());
}

#[test]
fn buffer_round_trips_through_accessors() {
    let data: Vec<u32> = (0u32..12).map(|v| argb(0xFF, v as u8, 0, 0)).collect();
    let image = PixelImage::new(data.clone(), 4, 3).unwrap();

    assert_eq!(image.pixels(), data.as_slice());
    assert_eq!(image.to_argb_vec(), data);
    for y in 0..3 {
        assert_eq!(image.row(y).unwrap(), &data[y * 4..y * 4 + 4]);
        for x in 0..4 {
            assert_eq!(image.get(x, y).unwrap(), data[y * 4 + x]);
            assert_eq!(image.get(x, y).unwrap(), image.get(x, y).unwrap());
        }
    }
    for x in 0..4 {
        let expected: Vec<u32> = (0..3).map(|y| data[y * 4 + x]).collect();
        assert_eq!(image.column(x).unwrap(), expected);
    }
}

#[test]
fn accessors_report_out_of_bounds() {
    let image = numbered(3, 2);
    assert_eq!(
        image.get(3, 0).err().unwrap(),
        ScreenMatchError::PixelOutOfBounds {
            x: 3,
            y: 0,
            width: 3,
            height: 2,
        }
    );
    assert!(image.get_at(Position::new(0, 2)).is_err());
    assert_eq!(
        image.row(2).err().unwrap(),
        ScreenMatchError::IndexOutOfBounds {
            index: 2,
            len: 2,
            context: "row",
        }
    );
    assert_eq!(
        image.column(7).err().unwrap(),
        ScreenMatchError::IndexOutOfBounds {
            index: 7,
            len: 3,
            context: "column",
        }
    );
    assert!(image.is_transparent(5, 5).is_err());
}

#[test]
fn channel_accessors_decompose_argb() {
    let image = PixelImage::new(vec![argb(0x40, 0x11, 0x22, 0x33), TRANSPARENT], 2, 1).unwrap();
    assert_eq!(image.alpha(0, 0).unwrap(), 0x40);
    assert_eq!(image.red(0, 0).unwrap(), 0x11);
    assert_eq!(image.green(0, 0).unwrap(), 0x22);
    assert_eq!(image.blue(0, 0).unwrap(), 0x33);
    assert!(!image.is_transparent(0, 0).unwrap());
    assert!(image.is_transparent(1, 0).unwrap());
}

#[test]
fn sub_image_copies_the_section() {
    let image = numbered(5, 4);
    let sub = image.sub_image(Section::new(1, 2, 3, 2)).unwrap();
    assert_eq!(sub.width(), 3);
    assert_eq!(sub.height(), 2);
    for y in 0..2 {
        for x in 0..3 {
            assert_eq!(sub.get(x, y).unwrap(), image.get(x + 1, y + 2).unwrap());
        }
    }

    let err = image.sub_image(Section::new(3, 3, 3, 2)).err().unwrap();
    assert_eq!(
        err,
        ScreenMatchError::RegionOutOfBounds {
            x: 3,
            y: 3,
            width: 3,
            height: 2,
            img_width: 5,
            img_height: 4,
        }
    );
}

#[test]
fn equality_is_by_value() {
    let a = numbered(4, 4);
    let b = numbered(4, 4);
    let c = numbered(4, 2);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.sub_image(Section::new(0, 0, 4, 2)).unwrap(), c);

    let transposed = PixelImage::new(a.to_argb_vec(), 2, 8).unwrap();
    assert_ne!(a, transposed);
}

#[test]
fn center_uses_floor_division() {
    assert_eq!(numbered(5, 4).center(), Position::new(2, 2));
    assert_eq!(numbered(1, 1).center(), Position::new(0, 0));
}

#[test]
fn positions_order_row_major() {
    let mut positions = vec![
        Position::new(3, 1),
        Position::new(0, 2),
        Position::new(9, 0),
        Position::new(1, 1),
    ];
    positions.sort();
    assert_eq!(
        positions,
        vec![
            Position::new(9, 0),
            Position::new(1, 1),
            Position::new(3, 1),
            Position::new(0, 2),
        ]
    );
}

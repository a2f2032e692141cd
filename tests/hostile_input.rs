mod common;

use bbuf::parse::DEFAULT_DEPTH_LIMIT;
use bbuf::prelude::*;
use bbuf::{DecodeError, DecodeResult, ParseError};

use common::*;

/// One level of `Foos { foos: Some([<next>]) }` inside a polymorphic slot
const FOOS_LEVEL: [u8; 3] = [0x04, 0x01, 0x01];

#[derive(Decode, Debug, PartialEq)]
struct Chain {
    next: Option<Box<Chain>>,
}

#[derive(Decode, Debug, PartialEq)]
struct Tree {
    kids: List<Tree>,
}

#[derive(Decode, Debug, PartialEq)]
struct Marker;

fn nested_foos(levels: usize) -> DynObject {
    let mut slot = DynObject::absent();
    for _ in 0..levels {
        let mut list: List = List::new();
        list.push(slot);
        slot = DynObject::new(Foos { foos: Some(list) });
    }
    slot
}

fn nested_foos_bytes(levels: usize) -> Vec<u8> {
    let mut bytes = FOOS_LEVEL.repeat(levels);
    bytes.push(0x00);
    bytes
}

fn is_too_deep<T: std::fmt::Debug>(res: &DecodeResult<T>) -> bool {
    matches!(
        res,
        Err(DecodeError::Parse(ParseError::DepthLimitExceeded { limit, .. })) if *limit == DEFAULT_DEPTH_LIMIT
    )
}

#[test]
fn deeply_nested_foos_rejected() {
    let res = DynObject::try_decode_with(nested_foos_bytes(200_000), REGISTRY.clone());
    assert!(is_too_deep(&res), "got {:?}", res.map(|_| ()));
}

#[test]
fn nesting_up_to_the_limit_decodes() {
    let bytes = nested_foos_bytes(3);
    assert_eq!(nested_foos(3).to_bytes(), bytes);

    // each level opens the object slot and its list
    let mut bb = ByteBuffer::from(bytes.clone())
        .with_registry(REGISTRY.clone())
        .with_depth_limit(6);
    assert_eq!(DynObject::decode_from(&mut bb).unwrap(), nested_foos(3));
    assert_eq!(bb.depth(), 0);

    let mut bb = ByteBuffer::from(bytes)
        .with_registry(REGISTRY.clone())
        .with_depth_limit(5);
    assert!(matches!(
        DynObject::decode_from(&mut bb),
        Err(DecodeError::Parse(ParseError::DepthLimitExceeded { limit: 5, offset: 9 }))
    ));
}

#[test]
fn boxed_recursion_rejected() {
    assert_eq!(
        Chain::try_decode(vec![0x01, 0x01, 0x00]).unwrap(),
        Chain {
            next: Some(Box::new(Chain {
                next: Some(Box::new(Chain { next: None }))
            }))
        }
    );

    let mut bytes = vec![0x01; 200_000];
    bytes.push(0x00);
    let res = Chain::try_decode(bytes);
    assert!(is_too_deep(&res), "got {:?}", res.map(|_| ()));
}

#[test]
fn list_recursion_rejected() {
    let mut bytes = vec![0x01; 200_000];
    bytes.push(0x00);
    let res = Tree::try_decode(bytes);
    assert!(is_too_deep(&res), "got {:?}", res.map(|_| ()));
}

#[test]
fn huge_count_of_zero_width_elements() {
    let mut bytes = vec![0x01];
    bytes.extend(bbuf::varint::encode_varint(u64::MAX));
    assert!(matches!(
        NullableList::<Marker>::try_decode(bytes),
        Err(DecodeError::Parse(ParseError::BufferUnderrun { offset: 11, .. }))
    ));
}

#[test]
fn huge_count_of_objects() {
    let mut bytes = vec![0x04, 0x01];
    bytes.extend(bbuf::varint::encode_varint(u64::MAX));
    bytes.extend_from_slice(&[0x00, 0x00]);
    assert!(matches!(
        DynObject::try_decode_with(bytes, REGISTRY.clone()),
        Err(DecodeError::Parse(ParseError::BufferUnderrun { offset: 14, requested: 1, .. }))
    ));
}

//! Sample message family shared by the integration tests
//!
//! `Foo` is a base message, `FooEx` extends it with one field, and `Foos`
//! holds a nullable polymorphic list of either.

#![allow(dead_code)]

use std::sync::Arc;

use bbuf::prelude::*;

#[derive(Encode, Decode, Clone, PartialEq, Debug)]
pub struct Foo {
    pub id: i32,
    pub name: Option<String>,
    pub age: Option<i32>,
}

impl Message for Foo {
    const TYPE_TAG: TypeTag = TypeTag::of(3);
}

#[derive(Encode, Decode, Clone, PartialEq, Debug)]
pub struct Foos {
    pub foos: NullableList,
}

impl Message for Foos {
    const TYPE_TAG: TypeTag = TypeTag::of(4);
}

#[derive(Encode, Decode, Clone, PartialEq, Debug)]
pub struct FooEx {
    pub base: Foo,
    pub weight: i32,
}

impl Message for FooEx {
    const TYPE_TAG: TypeTag = TypeTag::of(5);
}

lazy_static! {
    pub static ref REGISTRY: Arc<Registry> = {
        let mut reg = Registry::with_builtins();
        reg.register::<Foo>()
            .and_then(|reg| reg.register::<Foos>())
            .and_then(|reg| reg.register::<FooEx>())
            .expect("sample tags are distinct");
        reg.into_shared()
    };
}

pub fn sample_foo() -> Foo {
    Foo {
        id: 10,
        name: Some(String::from("asdf")),
        age: Some(20),
    }
}

pub fn sample_fooex() -> FooEx {
    FooEx {
        base: sample_foo(),
        weight: 30,
    }
}

/// `[FooEx, absent, absent, absent, Foo]`
pub fn sample_foos() -> Foos {
    let mut list: List = List::new();
    list.push_object(sample_fooex());
    list.push_absent();
    list.push_absent();
    list.push_absent();
    list.push_object(sample_foo());
    Foos { foos: Some(list) }
}

/// Body bytes of [`sample_foo`]
pub const FOO_BODY: [u8; 9] = [0x14, 0x01, 0x04, b'a', b's', b'd', b'f', 0x01, 0x28];

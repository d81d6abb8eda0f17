// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::hint::black_box;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use tessera_vm::{
    ecmascript::{
        abstract_operations::operations_on_objects::invoke,
        builtins::{Array, create_native_function},
        execution::{Agent, JsResult, Options},
        types::{ElementType, String, Value},
    },
    engine::{Bindable, GcScope},
};

const LEN: usize = 10_000;

fn call_method(
    agent: &mut Agent,
    receiver: Value<'static>,
    name: &str,
    arguments: &[Value<'static>],
    mut gc: GcScope,
) -> JsResult<'static, Value<'static>> {
    let key = String::from_str(agent, name, gc.nogc()).unbind();
    invoke(agent, receiver, key.into(), arguments, gc.reborrow()).unbind()
}

/// Pseudo-random but reproducible element values.
fn elements() -> Vec<Value<'static>> {
    (0..LEN)
        .map(|i| Value::from_f64(((i * 7919) % LEN) as f64))
        .collect()
}

fn array(agent: &mut Agent) -> Value<'static> {
    agent.run(|agent, gc| Value::from(Array::from_slice(agent, &elements(), gc.nogc()).unbind()))
}

fn typed_array(agent: &mut Agent, element_type: ElementType) -> Value<'static> {
    let source = array(agent);
    let constructor = agent.intrinsics().typed_array_constructor(element_type);
    agent
        .run(|agent, gc| call_method(agent, constructor.into(), "from", &[source], gc))
        .unwrap()
}

/// Time `name` called on a collection made once by `setup`.
fn bench_method(
    c: &mut Criterion,
    id: &str,
    options: Options,
    setup: impl Fn(&mut Agent) -> (Value<'static>, Vec<Value<'static>>),
    name: &'static str,
) {
    let mut agent = Agent::new(options);
    let (receiver, arguments) = setup(&mut agent);
    c.bench_function(id, |b| {
        b.iter(|| {
            agent.run(|agent, gc| {
                black_box(call_method(agent, receiver, name, &arguments, gc).unwrap());
            })
        })
    });
}

fn bench_sort(c: &mut Criterion) {
    for (id, options) in [
        ("Array toSorted (fast)", Options::default()),
        (
            "Array toSorted (generic)",
            Options {
                disable_fast_paths: true,
                ..Options::default()
            },
        ),
    ] {
        bench_method(c, id, options, |agent| (array(agent), vec![]), "toSorted");
    }
    bench_method(
        c,
        "Array toSorted with comparator",
        Options::default(),
        |agent| {
            let comparator = agent.run(|agent, gc| {
                create_native_function(
                    agent,
                    |_, _, arguments, _| {
                        let a = arguments.get(0).as_number().unwrap_or(f64::NAN);
                        let b = arguments.get(1).as_number().unwrap_or(f64::NAN);
                        Ok(Value::from_f64(a - b))
                    },
                    "compare",
                    2,
                    gc.nogc(),
                )
                .unbind()
            });
            (array(agent), vec![comparator.into()])
        },
        "toSorted",
    );
    bench_method(
        c,
        "Float64Array toSorted",
        Options::default(),
        |agent| (typed_array(agent, ElementType::Float64), vec![]),
        "toSorted",
    );
    bench_method(
        c,
        "Int32Array toSorted",
        Options::default(),
        |agent| (typed_array(agent, ElementType::Int32), vec![]),
        "toSorted",
    );
}

fn bench_join(c: &mut Criterion) {
    bench_method(
        c,
        "Array join",
        Options::default(),
        |agent| (array(agent), vec![]),
        "join",
    );
    bench_method(
        c,
        "Array join with separator",
        Options::default(),
        |agent| {
            let separator = agent.run(|agent, gc| String::from_str(agent, " | ", gc.nogc()).unbind());
            (array(agent), vec![separator.into()])
        },
        "join",
    );
    bench_method(
        c,
        "Uint8Array join",
        Options::default(),
        |agent| (typed_array(agent, ElementType::Uint8), vec![]),
        "join",
    );
}

fn bench_copy_within(c: &mut Criterion) {
    let overlapping = [0.0, 1.0].map(Value::from_f64).to_vec();
    for (id, element_type) in [
        ("Uint8Array copyWithin", ElementType::Uint8),
        ("Float64Array copyWithin", ElementType::Float64),
    ] {
        let arguments = overlapping.clone();
        bench_method(
            c,
            id,
            Options::default(),
            move |agent| (typed_array(agent, element_type), arguments.clone()),
            "copyWithin",
        );
    }
    for (id, options) in [
        ("Array copyWithin (fast)", Options::default()),
        (
            "Array copyWithin (generic)",
            Options {
                disable_fast_paths: true,
                ..Options::default()
            },
        ),
    ] {
        let arguments = overlapping.clone();
        bench_method(
            c,
            id,
            options,
            move |agent| (array(agent), arguments.clone()),
            "copyWithin",
        );
    }
}

fn bench_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("TypedArray set");
    for (id, source_type) in [
        ("same type", ElementType::Float64),
        ("converting", ElementType::Int32),
        ("from Array", ElementType::Float64),
    ] {
        let mut agent = Agent::new(Options::default());
        let target = typed_array(&mut agent, ElementType::Float64);
        let source = if id == "from Array" {
            array(&mut agent)
        } else {
            typed_array(&mut agent, source_type)
        };
        group.bench_function(id, |b| {
            b.iter_batched(
                || [source, Value::from_f64(0.0)],
                |arguments| {
                    agent.run(|agent, gc| {
                        black_box(call_method(agent, target, "set", &arguments, gc).unwrap());
                    })
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sort, bench_join, bench_copy_within, bench_set);
criterion_main!(benches);

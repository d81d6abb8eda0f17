// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
mod helper;

use clap::{Parser as ClapParser, Subcommand};
use helper::{Collection, build_collection, call_method, describe_error, render};
use tessera_vm::{
    ecmascript::{
        abstract_operations::operations_on_objects::{construct, set},
        builtins::{Array, create_native_function},
        execution::{Agent, JsResult, Options},
        types::{ElementType, PropertyKey, String as JsString, Value},
    },
    engine::{Bindable, GcScope},
};

/// Array and TypedArray algorithms from the command line
#[derive(Debug, ClapParser)] // requires `derive` feature
#[command(name = "tessera")]
#[command(about = "Runs indexed collection algorithms", long_about = None)]
struct Cli {
    /// Log representation transitions and fast path decisions
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Run every algorithm through the generic property protocol
    #[arg(long, global = true)]
    disable_fast_paths: bool,

    /// Largest index gap a packed array may grow by before it becomes sparse
    #[arg(long, global = true, default_value_t = Options::default().sparse_array_threshold)]
    sparse_threshold: u32,

    /// Largest ArrayBuffer that may be allocated, in bytes
    #[arg(long, global = true, default_value_t = Options::default().max_array_buffer_byte_length)]
    max_buffer_bytes: usize,

    /// Log each fallback from a fast path
    #[arg(long, global = true)]
    log_bailouts: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Calls a method with numeric arguments on a collection
    Call {
        #[arg(short, long, value_enum, default_value_t = Collection::Array)]
        collection: Collection,

        /// Comma separated elements
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        values: Vec<f64>,

        /// The prototype method to call, e.g. copyWithin
        method: std::string::String,

        /// Numeric arguments to the method
        #[arg(allow_negative_numbers = true)]
        arguments: Vec<f64>,
    },

    /// Joins a collection with a separator
    Join {
        #[arg(short, long, value_enum, default_value_t = Collection::Array)]
        collection: Collection,

        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        values: Vec<f64>,

        #[arg(short, long, default_value = ",")]
        separator: std::string::String,
    },

    /// Sorts a collection in place
    Sort {
        #[arg(short, long, value_enum, default_value_t = Collection::Array)]
        collection: Collection,

        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        values: Vec<f64>,

        /// Compare with a numeric comparator instead of the default order
        #[arg(short, long)]
        numeric: bool,

        #[arg(short, long)]
        descending: bool,
    },

    /// Runs a fixed set of example expressions
    Scenarios {},
}

impl Cli {
    fn options(&self) -> Options {
        Options {
            disable_fast_paths: self.disable_fast_paths,
            sparse_array_threshold: self.sparse_threshold,
            max_array_buffer_byte_length: self.max_buffer_bytes,
            log_fast_path_bailouts: self.log_bailouts,
        }
    }
}

fn main() {
    let args = Cli::parse();
    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
    log::info!("running {:?}", args.command);

    let mut agent = Agent::new(args.options());
    let result = agent.run(|agent, gc| {
        run_command(agent, &args.command, gc).map_err(|error| describe_error(agent, error))
    });
    match result {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
        }
        Err(message) => {
            eprintln!("Uncaught exception: {message}");
            std::process::exit(1);
        }
    }
}

fn run_command(
    agent: &mut Agent,
    command: &Command,
    mut gc: GcScope,
) -> JsResult<'static, Vec<std::string::String>> {
    match command {
        Command::Call {
            collection,
            values,
            method,
            arguments,
        } => {
            let o = build_collection(agent, *collection, values, gc.reborrow())?;
            let arguments = arguments.iter().map(|n| Value::from_f64(*n)).collect::<Vec<_>>();
            let result = call_method(agent, o, method, &arguments, gc.reborrow())?;
            Ok(vec![
                format!("result: {}", render(agent, result, gc.reborrow())?),
                format!("receiver: {}", render(agent, o, gc.reborrow())?),
            ])
        }
        Command::Join {
            collection,
            values,
            separator,
        } => {
            let o = build_collection(agent, *collection, values, gc.reborrow())?;
            let separator = JsString::from_str(agent, separator, gc.nogc()).unbind();
            let result = call_method(agent, o, "join", &[separator.into()], gc.reborrow())?;
            Ok(vec![render(agent, result, gc.reborrow())?])
        }
        Command::Sort {
            collection,
            values,
            numeric,
            descending,
        } => {
            let o = build_collection(agent, *collection, values, gc.reborrow())?;
            let arguments = if *numeric || *descending {
                let sign = if *descending { -1.0 } else { 1.0 };
                let comparator = create_native_function(
                    agent,
                    move |_, _, arguments, _| {
                        let a = arguments.get(0).as_number().unwrap_or(f64::NAN);
                        let b = arguments.get(1).as_number().unwrap_or(f64::NAN);
                        Ok(Value::from_f64(sign * (a - b)))
                    },
                    "compare",
                    2,
                    gc.nogc(),
                )
                .unbind();
                vec![comparator.into()]
            } else {
                vec![]
            };
            let result = call_method(agent, o, "sort", &arguments, gc.reborrow())?;
            Ok(vec![render(agent, result, gc.reborrow())?])
        }
        Command::Scenarios {} => scenarios(agent, gc),
    }
}

fn scenarios(agent: &mut Agent, mut gc: GcScope) -> JsResult<'static, Vec<std::string::String>> {
    let mut lines = Vec::new();

    let target = build_collection(agent, Collection::Int8, &[1.0, 2.0, 3.0], gc.reborrow())?;
    let source = build_collection(agent, Collection::Int8, &[10.0, 20.0], gc.reborrow())?;
    call_method(agent, target, "set", &[source, Value::from_f64(1.0)], gc.reborrow())?;
    lines.push(format!(
        "Int8Array.from([1,2,3]).set(Int8Array.from([10,20]),1) => {}",
        render(agent, target, gc.reborrow())?
    ));

    let float64 = agent.intrinsics().typed_array_constructor(ElementType::Float64);
    let elements = [1.0, 2.0, 3.0].map(Value::from_f64);
    let array = Array::from_slice(agent, &elements, gc.nogc()).unbind();
    let o = construct(agent, float64, &[array.into()], None, gc.reborrow()).unbind()?;
    let result = call_method(
        agent,
        o,
        "copyWithin",
        &[Value::from_f64(0.0), Value::from_f64(1.0)],
        gc.reborrow(),
    )?;
    lines.push(format!(
        "new Float64Array([1,2,3]).copyWithin(0,1) => {}",
        render(agent, result, gc.reborrow())?
    ));

    let array_constructor = agent.intrinsics().array();
    let o = construct(agent, array_constructor, &[Value::from_f64(3.0)], None, gc.reborrow()).unbind()?;
    set(agent, o, PropertyKey::from(0u32), Value::from_f64(1.0), true, gc.reborrow()).unbind()?;
    set(agent, o, PropertyKey::from(2u32), Value::from_f64(3.0), true, gc.reborrow()).unbind()?;
    let separator = JsString::from_str(agent, "-", gc.nogc()).unbind();
    let result = call_method(agent, o, "join", &[separator.into()], gc.reborrow())?;
    lines.push(format!(
        "[1,,3].join('-') => {}",
        render(agent, result, gc.reborrow())?
    ));

    let comparator = create_native_function(
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
    .unbind();
    let o = build_collection(agent, Collection::Array, &[5.0, 3.0, 4.0, 1.0, 2.0], gc.reborrow())?;
    let result = call_method(agent, o, "sort", &[comparator.into()], gc.reborrow())?;
    lines.push(format!(
        "[5,3,4,1,2].sort((a,b)=>a-b) => {}",
        render(agent, result, gc.reborrow())?
    ));

    Ok(lines)
}

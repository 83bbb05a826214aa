// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request dispatch: translate wire requests into engine calls.

use lattice_engine::{Engine, EngineError};
use lattice_wire::{Request, Response};

/// What the connection handler should do after dispatch.
pub enum Outcome {
    /// Write the response and close the connection.
    Reply(Response),
    /// Upgrade the connection to a sync stream.
    Sync,
}

/// Run one request against the engine.
///
/// Every engine call here takes the global serializer internally; dispatch
/// itself never blocks on anything but that lock.
pub fn dispatch(engine: &Engine, request: Request) -> Outcome {
    match request {
        Request::Ping => Outcome::Reply(Response::Ok),

        Request::GraphNew => {
            engine.new_graph();
            Outcome::Reply(Response::Ok)
        }
        Request::GraphLoad { path } => reply(engine.load(&path)),
        Request::GraphSave { path } => reply(engine.save(path.as_deref())),
        Request::GraphSync => Outcome::Sync,
        Request::GraphStates => Outcome::Reply(Response::States { states: engine.node_states() }),
        Request::Connect { edge } => reply(engine.connect(edge)),
        Request::Disconnect { edge } => reply(engine.disconnect(edge)),
        Request::ScheduleAll => {
            engine.schedule_all();
            Outcome::Reply(Response::Ok)
        }

        Request::NodeRun { id } => reply(engine.run_node(id)),
        Request::NodeSchedule { id } => reply(engine.schedule_node(id)),
        Request::NodePlan { id, plan } => reply(engine.plan_node(id, plan)),
        Request::NodeStop { id } => reply(engine.stop_node(id)),
        Request::NodeSkip { id } => reply(engine.skip_node(id)),
        Request::NodeDone { id } => reply(engine.done_node(id)),
        Request::NodeReset { id } => reply(engine.reset_node(id)),
        Request::NodeArts { id } => match engine.collect_arts(id) {
            Ok(arts) => Outcome::Reply(Response::Arts { arts }),
            Err(e) => error(e),
        },
        Request::NodeAdd { config } => match engine.add_node(config) {
            Ok(id) => Outcome::Reply(Response::NodeId { id }),
            Err(e) => error(e),
        },
        Request::NodeEdit { config } => reply(engine.edit_node(config)),
        Request::NodeDelete { id } => reply(engine.delete_node(id)),
    }
}

fn reply(result: Result<(), EngineError>) -> Outcome {
    match result {
        Ok(()) => Outcome::Reply(Response::Ok),
        Err(e) => error(e),
    }
}

fn error(e: EngineError) -> Outcome {
    Outcome::Reply(Response::Error { kind: e.kind(), message: e.to_string() })
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;

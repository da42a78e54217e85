//! Serialised edits for callers that live on other threads.
//!
//! Edits are not safe to interleave, so anything off the simulation
//! thread sends [`EditCommand`]s through an [`EditSender`]. The simulation
//! thread calls [`EditQueue::drain`] once per frame and runs them in
//! arrival order, each to completion.

use std::sync::mpsc::{self, Receiver, Sender};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    edit::Editor,
    error::EditError,
    host::Host,
    kepler::orbits::{Elements, OrbitId},
    lander::{self, Site},
    misc,
    time::UT,
    vessel::VesselId,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EditCommand {
    SetOrbit { orbit: OrbitId, elements: Elements },
    OffsetFrame(Vector3<f64>),
    SetTime(UT),
    AlignSemiMajorAxes { orbits: Vec<OrbitId>, semi_major_axis: f64 },
    DestroyVessel(VesselId),
    RefillResources(VesselId),
    Land { vessel: VesselId, site: Site },
}

impl EditCommand {
    pub fn run<H: Host>(&self, editor: &mut Editor<'_, H>) -> Result<(), EditError> {
        match self {
            EditCommand::SetOrbit { orbit, elements } => editor.set_orbit(*orbit, elements),
            EditCommand::OffsetFrame(offset) => editor.offset_frame(*offset),
            EditCommand::SetTime(ut) => {
                misc::set_universal_time(editor, *ut);
                Ok(())
            }
            EditCommand::AlignSemiMajorAxes {
                orbits,
                semi_major_axis,
            } => misc::align_semi_major_axes(editor, orbits, *semi_major_axis),
            EditCommand::DestroyVessel(vessel) => misc::destroy_vessel(editor, *vessel),
            EditCommand::RefillResources(vessel) => {
                misc::refill_resources(editor, *vessel).map(|_| ())
            }
            EditCommand::Land { vessel, site } => lander::land_at(editor, *vessel, site),
        }
    }
}

#[derive(Clone, Debug)]
pub struct EditSender(Sender<EditCommand>);

impl EditSender {
    pub fn send(&self, command: EditCommand) -> Result<(), EditError> {
        self.0.send(command).map_err(|_| EditError::QueueClosed)
    }
}

#[derive(Debug)]
pub struct EditQueue {
    tx: Sender<EditCommand>,
    rx: Receiver<EditCommand>,
}

impl Default for EditQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EditQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub fn sender(&self) -> EditSender {
        EditSender(self.tx.clone())
    }

    /// Run every command queued so far, oldest first.
    pub fn drain<H: Host>(
        &self,
        editor: &mut Editor<'_, H>,
    ) -> Vec<(EditCommand, Result<(), EditError>)> {
        let mut results = Vec::new();
        while let Ok(command) = self.rx.try_recv() {
            let res = command.run(editor);
            match &res {
                Ok(()) => debug!(?command, "edit applied"),
                Err(err) => warn!(?command, %err, "edit refused"),
            }
            results.push((command, res));
        }
        results
    }
}

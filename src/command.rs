use crate::error::CommandError;
use crate::sketch::Sketch;
use crate::stroke::StrokeRef;

/// Undoable changes to a [`Sketch`]
#[derive(Debug, Clone)]
pub enum Command {
    /// Append a completed stroke
    AddStroke(StrokeRef),
    /// Remove every stroke; undo restores them
    Clear { removed: Vec<StrokeRef> },
}

impl Command {
    pub fn execute(&mut self, sketch: &mut Sketch) {
        match self {
            Command::AddStroke(stroke) => sketch.add_stroke(stroke.clone()),
            Command::Clear { removed } => *removed = sketch.clear(),
        }
    }

    pub fn undo(&mut self, sketch: &mut Sketch) {
        match self {
            Command::AddStroke(_) => {
                sketch.remove_last_stroke();
            }
            Command::Clear { removed } => {
                for stroke in removed.drain(..) {
                    sketch.add_stroke(stroke);
                }
            }
        }
    }
}

/// Undo and redo stacks over executed commands
#[derive(Debug, Default)]
pub struct CommandHistory {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute a command and record it
    pub fn execute(&mut self, mut command: Command, sketch: &mut Sketch) {
        command.execute(sketch);
        self.undo_stack.push(command);
        self.redo_stack.clear();
    }

    pub fn undo(&mut self, sketch: &mut Sketch) -> Result<(), CommandError> {
        let mut command = self.undo_stack.pop().ok_or(CommandError::NothingToUndo)?;
        command.undo(sketch);
        self.redo_stack.push(command);
        Ok(())
    }

    pub fn redo(&mut self, sketch: &mut Sketch) -> Result<(), CommandError> {
        let mut command = self.redo_stack.pop().ok_or(CommandError::NothingToRedo)?;
        command.execute(sketch);
        self.undo_stack.push(command);
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

pub mod transition_requisition_command;

pub use transition_requisition_command::TransitionRequisitionCommand;

//! Tag derivation.
//!
//! Both functions are total over a validated [`FeatureConfig`]; every rule is
//! independent and the results are unions of the rules that apply.

use crate::core::compiler::CompilerFamily;
use crate::core::feature::{FeatureConfig, OpenmpMeasure, SourceInst};
use crate::core::tag::{names, TagSet};
use crate::core::target::TargetOs;

/// Tags a variant must carry to satisfy `config`.
pub fn derive_tags(config: &FeatureConfig) -> TagSet {
    let mut tags = TagSet::new();

    if let Some(tag) = compiler_tag(config.cxx_compiler().family, config.target_os) {
        tags.insert(tag);
    }

    if config.source_inst == SourceInst::Automatic {
        tags.insert(names::PDT);
    }

    if config.metrics.iter().any(|m| m.contains("PAPI")) {
        tags.insert(names::PAPI);
    }

    if config.openmp_support {
        tags.insert(names::OPENMP);
        match config.measure_openmp {
            OpenmpMeasure::Ompt => {
                tags.insert(names::OMPT);
            }
            OpenmpMeasure::Opari => {
                tags.insert(names::OPARI);
            }
            OpenmpMeasure::None => {}
        }
    }

    let flags = [
        (config.pthreads_support, names::PTHREAD),
        (config.mpi_support, names::MPI),
        (config.cuda_support, names::CUPTI),
        (config.shmem_support, names::SHMEM),
        (config.mpc_support, names::MPC),
    ];
    tags.extend(flags.into_iter().filter(|(on, _)| *on).map(|(_, tag)| tag));

    tracing::debug!("desired tags: {{{}}}", tags);
    tags
}

/// Tags an approximate match must not carry.
pub fn incompatible_tags(config: &FeatureConfig) -> TagSet {
    let mut tags = TagSet::new();

    if !config.mpi_support {
        tags.insert(names::MPI);
    }
    if config.measure_openmp != OpenmpMeasure::Opari {
        tags.insert(names::OPARI);
    }
    if !config.openmp_support {
        tags.insert(names::OPENMP);
    }

    tracing::debug!("incompatible tags: {{{}}}", tags);
    tags
}

/// The variant tag contributed by the C++ compiler family.
fn compiler_tag(family: CompilerFamily, os: TargetOs) -> Option<&'static str> {
    match family {
        CompilerFamily::Intel => match os {
            TargetOs::CrayCnl => Some(names::INTEL),
            TargetOs::Linux | TargetOs::Darwin | TargetOs::BlueGeneQ => Some(names::ICPC),
        },
        CompilerFamily::Pgi => Some(names::PGI),
        CompilerFamily::Gnu
        | CompilerFamily::Cray
        | CompilerFamily::Ibm
        | CompilerFamily::IbmBg
        | CompilerFamily::Llvm
        | CompilerFamily::SystemMpi
        | CompilerFamily::IntelMpi
        | CompilerFamily::IbmMpi
        | CompilerFamily::Other => None,
    }
}

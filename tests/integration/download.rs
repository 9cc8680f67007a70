//! Happy-path download scenarios.

use anyhow::Result;

use fecftp_client::transfer;

use crate::infra::{
    config_for, corrupt_packet, data_packet, dest_path, full_block_data, ScriptStep,
    ScriptedServer,
};

#[tokio::test]
async fn full_block_then_short_final_block() -> Result<()> {
    let block1 = full_block_data(0xA7);
    let final_data: Vec<u8> = (1..=20).collect();

    let server = ScriptedServer::spawn(vec![
        ScriptStep::SendAwait(data_packet(1, &block1)),
        ScriptStep::Send(data_packet(2, &final_data)),
    ])
    .await?;
    let config = config_for(&server);
    let dest = dest_path("two-blocks");

    let written = transfer::download("127.0.0.1", "a.txt", &dest, false, &config).await?;
    assert_eq!(written, 416 + 20);

    // Exactly the concatenation of the two corrected, de-padded payloads.
    let mut expected = block1;
    expected.extend_from_slice(&final_data);
    assert_eq!(tokio::fs::read(&dest).await?, expected);

    // One read request, then exactly one ACK — for block 1 only. The final
    // block must not be acknowledged.
    let received = server.finish().await?;
    assert_eq!(received.len(), 2);
    assert_eq!(&received[0][..2], [0x00, 0x01], "expected a read request");
    assert!(received[0].ends_with(b"octet\0"));
    assert_eq!(received[1], [0x00, 0x04, 0x00, 0x01]);

    tokio::fs::remove_file(&dest).await?;
    Ok(())
}

#[tokio::test]
async fn noisy_mode_sends_the_variant_opcode() -> Result<()> {
    let server = ScriptedServer::spawn(vec![ScriptStep::Send(data_packet(1, &[1, 2, 3]))])
        .await?;
    let config = config_for(&server);
    let dest = dest_path("noisy-request");

    transfer::download("127.0.0.1", "a.txt", &dest, true, &config).await?;

    let received = server.finish().await?;
    assert_eq!(&received[0][..2], [0x00, 0x02]);

    tokio::fs::remove_file(&dest).await?;
    Ok(())
}

#[tokio::test]
async fn corrupt_block_is_nacked_once_then_resent_clean() -> Result<()> {
    let blocks: Vec<Vec<u8>> = (1..=3).map(|i| full_block_data(i as u8)).collect();
    let final_data = vec![0xEE; 40];

    let server = ScriptedServer::spawn(vec![
        ScriptStep::SendAwait(data_packet(1, &blocks[0])),
        ScriptStep::SendAwait(data_packet(2, &blocks[1])),
        // First delivery of block 3 carries a double-bit error.
        ScriptStep::SendAwait(corrupt_packet(3, &blocks[2])),
        ScriptStep::SendAwait(data_packet(3, &blocks[2])),
        ScriptStep::Send(data_packet(4, &final_data)),
    ])
    .await?;
    let config = config_for(&server);
    let dest = dest_path("nack-resend");

    let written = transfer::download("127.0.0.1", "a.txt", &dest, false, &config).await?;
    assert_eq!(written, 3 * 416 + 40);

    let mut expected = Vec::new();
    for block in &blocks {
        expected.extend_from_slice(block);
    }
    expected.extend_from_slice(&final_data);
    assert_eq!(tokio::fs::read(&dest).await?, expected);

    // request, ACK 1, ACK 2, exactly one NACK 3, ACK 3.
    let received = server.finish().await?;
    assert_eq!(received.len(), 5);
    assert_eq!(received[1], [0x00, 0x04, 0x00, 0x01]);
    assert_eq!(received[2], [0x00, 0x04, 0x00, 0x02]);
    assert_eq!(received[3], [0x00, 0x06, 0x00, 0x03]);
    assert_eq!(received[4], [0x00, 0x04, 0x00, 0x03]);

    tokio::fs::remove_file(&dest).await?;
    Ok(())
}

#[tokio::test]
async fn empty_terminal_block_yields_an_empty_file() -> Result<()> {
    let server =
        ScriptedServer::spawn(vec![ScriptStep::Send(data_packet(1, &[]))]).await?;
    let config = config_for(&server);
    let dest = dest_path("empty-file");

    let written = transfer::download("127.0.0.1", "a.txt", &dest, false, &config).await?;
    assert_eq!(written, 0);
    assert_eq!(tokio::fs::read(&dest).await?, Vec::<u8>::new());

    // No ACK follows the terminal block.
    let received = server.finish().await?;
    assert_eq!(received.len(), 1);

    tokio::fs::remove_file(&dest).await?;
    Ok(())
}
